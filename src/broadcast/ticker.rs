//! Timer abstraction driving the broadcaster

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Source of broadcast ticks
#[async_trait::async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    async fn tick(&mut self);
}

/// Fixed-period ticker on the tokio clock. The first tick fires immediately;
/// ticks missed while a broadcast runs long are skipped, never queued.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait::async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
