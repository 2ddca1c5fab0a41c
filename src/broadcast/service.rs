//! Status broadcaster
//!
//! Checks every monitored service once per tick and posts a notification to
//! each enabled webhook whose last known status differs from the fresh one.
//! Deliveries run concurrently, capped, and the whole tick runs against a
//! deadline so it cannot outgrow the polling period.

use crate::BROADCAST_TARGET;
use crate::broadcast::{DeliveryError, IntervalTicker, Notification, Ticker, WebhookSender};
use crate::status::{FetchError, FetchResult, ServiceName, StatusChecker, StatusReport};
use crate::webhook::{ConfigStore, WebhookConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Default bound on one status check or one delivery
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Default deadline for a whole tick, half the default five minute period
pub const DEFAULT_TICK_BUDGET: Duration = Duration::from_secs(150);
/// Default number of webhook deliveries in flight at once
pub const DEFAULT_MAX_CONCURRENT_DELIVERIES: usize = 8;

/// Requests accepted by a running broadcaster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastRequest {
    /// Run a tick now, outside the schedule
    CheckNow,
    /// Stop the broadcast task
    Shutdown,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Services whose status was fetched
    pub services_checked: usize,
    /// Services skipped because the fetch or the store read failed
    pub services_failed: usize,
    /// Notifications accepted by their webhook
    pub notifications_sent: usize,
    /// Notifications that could not be delivered
    pub deliveries_failed: usize,
    /// Notifications not attempted because the tick ran out of time; their
    /// status is left alone so the next tick retries them
    pub deliveries_skipped: usize,
    /// Status writes that found their configuration removed or replaced
    pub stale_writes: usize,
}

/// Outcome of one pending notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Failed,
    Skipped,
}

/// One configuration to notify about one fresh report
struct Job {
    config: WebhookConfig,
    report: Arc<StatusReport>,
}

/// Periodic status-change detector and notifier
#[derive(Clone)]
pub struct Broadcaster {
    store: Arc<dyn ConfigStore>,
    checker: Arc<dyn StatusChecker>,
    sender: Arc<dyn WebhookSender>,
    call_timeout: Duration,
    tick_budget: Duration,
    max_concurrent_deliveries: usize,
}

impl Broadcaster {
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigStore>,
        checker: Arc<dyn StatusChecker>,
        sender: Arc<dyn WebhookSender>,
    ) -> Self {
        Self {
            store,
            checker,
            sender,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            tick_budget: DEFAULT_TICK_BUDGET,
            max_concurrent_deliveries: DEFAULT_MAX_CONCURRENT_DELIVERIES,
        }
    }

    /// Bound each status check and each webhook delivery
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Deadline for a whole tick, measured from its start. Deliveries not
    /// started by then are skipped until the next tick.
    #[must_use]
    pub const fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = budget;
        self
    }

    /// Cap on webhook deliveries in flight at once (at least one)
    #[must_use]
    pub fn with_max_concurrent_deliveries(mut self, max: usize) -> Self {
        self.max_concurrent_deliveries = max.max(1);
        self
    }

    /// Spawn the broadcast loop on a fixed-period ticker.
    ///
    /// Returns the request sender and the task handle.
    pub fn spawn(self, period: Duration) -> (Sender<BroadcastRequest>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(self.run(IntervalTicker::new(period), rx));
        (tx, handle)
    }

    /// Broadcast on every tick until `Shutdown` arrives or every sender is gone.
    pub async fn run<T: Ticker>(self, mut ticker: T, mut requests: Receiver<BroadcastRequest>) {
        info!(target: BROADCAST_TARGET, "Status broadcaster started");

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(BroadcastRequest::CheckNow) => {
                        info!(target: BROADCAST_TARGET, "Received request to broadcast now");
                        self.timed_tick().await;
                    }
                    Some(BroadcastRequest::Shutdown) | None => {
                        info!(target: BROADCAST_TARGET, "Received shutdown request for broadcaster");
                        break;
                    }
                },
                () = ticker.tick() => {
                    self.timed_tick().await;
                }
            }
        }

        info!(target: BROADCAST_TARGET, "Status broadcaster shut down");
    }

    async fn timed_tick(&self) -> TickReport {
        let started = Instant::now();
        let report = self.tick().await;
        let elapsed = started.elapsed();

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        info!(
            target: BROADCAST_TARGET,
            services_checked = report.services_checked,
            services_failed = report.services_failed,
            notifications_sent = report.notifications_sent,
            deliveries_failed = report.deliveries_failed,
            deliveries_skipped = report.deliveries_skipped,
            stale_writes = report.stale_writes,
            duration_ms = duration_ms,
            event = "tick",
            "Broadcast tick completed"
        );
        if report.deliveries_skipped > 0 {
            warn!(
                target: BROADCAST_TARGET,
                "Tick budget of {}s exhausted, {} notification(s) deferred to the next tick",
                self.tick_budget.as_secs(),
                report.deliveries_skipped
            );
        }

        report
    }

    /// Run one check-and-notify cycle. Never fails: every error is isolated to
    /// the service or configuration it concerns.
    pub async fn tick(&self) -> TickReport {
        let deadline = Instant::now() + self.tick_budget;
        let mut report = TickReport::default();

        let results = self.check_all(deadline).await;
        // A check task that panicked never reported back
        report.services_failed += ServiceName::ALL.len().saturating_sub(results.len());

        let mut jobs = Vec::new();
        for (service, result) in results {
            match result {
                Ok(status) => {
                    report.services_checked += 1;
                    self.collect_jobs(status, &mut jobs, &mut report).await;
                }
                Err(e) => {
                    warn!(target: BROADCAST_TARGET, "Skipping {service} this tick: {e}");
                    report.services_failed += 1;
                }
            }
        }

        self.fan_out(jobs, deadline, &mut report).await;
        report
    }

    /// One bounded check per service, run concurrently, returned in service order
    async fn check_all(&self, deadline: Instant) -> Vec<(ServiceName, FetchResult<StatusReport>)> {
        let limit = (Instant::now() + self.call_timeout).min(deadline);
        let mut checks = JoinSet::new();
        for service in ServiceName::ALL {
            let checker = Arc::clone(&self.checker);
            let timeout = self.call_timeout;
            checks.spawn(async move {
                let result = tokio::time::timeout_at(limit, checker.check_status(service))
                    .await
                    .unwrap_or(Err(FetchError::Timeout {
                        service,
                        after: timeout,
                    }));
                (service, result)
            });
        }

        let mut results = Vec::with_capacity(ServiceName::ALL.len());
        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(target: BROADCAST_TARGET, "Status check task failed: {e}"),
            }
        }

        results.sort_by_key(|(service, _)| *service);
        results
    }

    /// Queue a job for every enabled configuration whose status changed
    async fn collect_jobs(
        &self,
        status: StatusReport,
        jobs: &mut Vec<Job>,
        report: &mut TickReport,
    ) {
        let service = status.service;
        let configs = match self.store.list_enabled_by_service(service).await {
            Ok(configs) => configs,
            Err(e) => {
                error!(target: BROADCAST_TARGET, "Failed to list {service} webhooks: {e}");
                report.services_failed += 1;
                return;
            }
        };

        let status = Arc::new(status);
        jobs.extend(
            configs
                .into_iter()
                .filter(|config| config.has_changed(status.status))
                .map(|config| Job {
                    config,
                    report: Arc::clone(&status),
                }),
        );
    }

    /// Deliver every job, at most `max_concurrent_deliveries` at a time, none
    /// of them outliving the deadline
    async fn fan_out(&self, jobs: Vec<Job>, deadline: Instant, report: &mut TickReport) {
        let permits = Arc::new(Semaphore::new(self.max_concurrent_deliveries));
        let mut deliveries = JoinSet::new();

        for job in jobs {
            let this = self.clone();
            let permits = Arc::clone(&permits);
            deliveries.spawn(async move {
                // Queued jobs still waiting at the deadline give up here
                let acquired = tokio::time::timeout_at(deadline, permits.acquire_owned()).await;
                let Ok(Ok(_permit)) = acquired else {
                    return (Delivery::Skipped, false);
                };
                this.notify(&job, deadline).await
            });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((delivery, stale)) => {
                    match delivery {
                        Delivery::Sent => report.notifications_sent += 1,
                        Delivery::Failed => report.deliveries_failed += 1,
                        Delivery::Skipped => report.deliveries_skipped += 1,
                    }
                    if stale {
                        report.stale_writes += 1;
                    }
                }
                Err(e) => {
                    error!(target: BROADCAST_TARGET, "Delivery task failed: {e}");
                    report.deliveries_failed += 1;
                }
            }
        }
    }

    /// Deliver one notification, then record its status. Returns the delivery
    /// outcome and whether the status write found the configuration gone.
    async fn notify(&self, job: &Job, deadline: Instant) -> (Delivery, bool) {
        let config = &job.config;
        if Instant::now() >= deadline {
            return (Delivery::Skipped, false);
        }

        let notification = Notification::for_config(config, (*job.report).clone());
        let limit = (Instant::now() + self.call_timeout).min(deadline);
        let delivery = tokio::time::timeout_at(
            limit,
            self.sender.deliver(&config.webhook_url, &notification),
        )
        .await
        .unwrap_or(Err(DeliveryError::Timeout(self.call_timeout)));

        let outcome = match delivery {
            Ok(()) => {
                info!(
                    target: BROADCAST_TARGET,
                    guild_id = config.guild_id,
                    service = %config.service,
                    status = %job.report.status,
                    event = "notified",
                    "Posted status change"
                );
                Delivery::Sent
            }
            Err(e) => {
                warn!(
                    target: BROADCAST_TARGET,
                    guild_id = config.guild_id,
                    service = %config.service,
                    error = %e,
                    "Failed to deliver status change"
                );
                Delivery::Failed
            }
        };

        // Advances even when delivery failed
        match self.store.update_last_status(config, job.report.status).await {
            Ok(()) => (outcome, false),
            Err(e) if e.is_not_found() => {
                debug!(
                    target: BROADCAST_TARGET,
                    "{config} was removed or replaced during the tick, dropping its status"
                );
                (outcome, true)
            }
            Err(e) => {
                error!(target: BROADCAST_TARGET, "Failed to record status for {config}: {e}");
                (outcome, false)
            }
        }
    }
}
