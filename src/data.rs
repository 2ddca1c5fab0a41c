use std::{ops::Deref, sync::Arc, time::Instant};

use crate::broadcast::BroadcastRequest;
use crate::config::BotConfig;
use crate::status::StatusChecker;
use crate::webhook::ConfigStore;
use tokio::sync::mpsc::Sender;

/// Centralized data structure for the bot
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &self.config)
            .field("started_at", &self.started_at)
            .field("broadcast_tx", &self.broadcast_tx)
            .finish_non_exhaustive()
    }
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    #[must_use]
    pub fn new(
        config: BotConfig,
        store: Arc<dyn ConfigStore>,
        checker: Arc<dyn StatusChecker>,
        broadcast_tx: Sender<BroadcastRequest>,
    ) -> Self {
        Self(Arc::new(DataInner {
            config,
            store,
            checker,
            broadcast_tx,
            started_at: Instant::now(),
        }))
    }

    /// Time since the bot process started
    #[must_use]
    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

/// Shared state handed to every command
pub struct DataInner {
    pub config: BotConfig,
    // Webhook configurations, shared with the broadcaster
    pub store: Arc<dyn ConfigStore>,
    // Live status lookups for on-demand checks
    pub checker: Arc<dyn StatusChecker>,
    // Requests to the running broadcaster
    pub broadcast_tx: Sender<BroadcastRequest>,
    pub started_at: Instant,
}

/// Render a duration as `1d 2h 3m 4s`, omitting leading zero units
#[must_use]
pub fn format_uptime(uptime: std::time::Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
    );

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MockStatusChecker;
    use crate::webhook::MockConfigStore;
    use std::collections::HashMap;
    use std::time::Duration;

    fn test_data() -> (Data, tokio::sync::mpsc::Receiver<BroadcastRequest>) {
        let config = BotConfig::from_sources(
            |key| match key {
                "DISCORD_TOKEN" => Some("token".to_string()),
                "OWNER_ID" => Some("42".to_string()),
                _ => None,
            },
            None,
        )
        .unwrap();
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let data = Data::new(
            config,
            Arc::new(MockConfigStore::new()),
            Arc::new(MockStatusChecker::new()),
            tx,
        );
        (data, rx)
    }

    #[test]
    fn test_data_new() {
        let (data, _rx) = test_data();
        assert_eq!(data.config.owner_id.get(), 42);
        assert!(data.uptime() < Duration::from_secs(60));
    }

    #[test]
    fn test_data_clone_shares_inner() {
        let (data, _rx) = test_data();
        let clone = data.clone();
        assert!(Arc::ptr_eq(&data.0, &clone.0));
    }

    #[test]
    fn test_data_debug_impl() {
        let (data, _rx) = test_data();
        let debug = format!("{data:?}");
        assert!(debug.contains("Data"));
        assert!(debug.contains("owner_id"));
        assert!(!debug.contains("\"token\""));
    }

    #[tokio::test]
    async fn test_broadcast_requests_reach_receiver() {
        let (data, mut rx) = test_data();
        data.broadcast_tx
            .send(BroadcastRequest::CheckNow)
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(BroadcastRequest::CheckNow));
    }

    #[test]
    fn test_format_uptime() {
        let cases = HashMap::from([
            (5, "5s"),
            (65, "1m 5s"),
            (3_661, "1h 1m 1s"),
            (90_061, "1d 1h 1m 1s"),
        ]);
        for (secs, expected) in cases {
            assert_eq!(format_uptime(Duration::from_secs(secs)), expected);
        }
    }
}
