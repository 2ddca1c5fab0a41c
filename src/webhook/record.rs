//! Webhook configuration records

use crate::status::{ServiceName, ServiceStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a guild wants updates for one service delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Guild the configuration belongs to
    pub guild_id: u64,
    /// Monitored service
    pub service: ServiceName,
    /// Discord webhook URL notifications are posted to
    pub webhook_url: String,
    /// Channel the webhook posts into, for display
    pub channel_id: Option<u64>,
    /// Role mentioned in every notification
    pub ping_role_id: Option<u64>,
    /// Disabled configurations are skipped by the broadcaster
    pub enabled: bool,
    /// Last status observed for this guild, `None` until the first check
    pub last_status: Option<ServiceStatus>,
}

impl WebhookConfig {
    /// A fresh, enabled configuration that has never been checked
    #[must_use]
    pub fn new(guild_id: u64, service: ServiceName, target: WebhookTarget) -> Self {
        Self {
            guild_id,
            service,
            webhook_url: target.webhook_url,
            channel_id: target.channel_id,
            ping_role_id: target.ping_role_id,
            enabled: true,
            last_status: None,
        }
    }

    /// Whether `status` differs from the last one observed
    #[must_use]
    pub fn has_changed(&self, status: ServiceStatus) -> bool {
        self.last_status != Some(status)
    }
}

impl fmt::Display for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} webhook for guild {} ({})",
            self.service,
            self.guild_id,
            if self.enabled { "enabled" } else { "disabled" }
        )
    }
}

/// Destination details supplied when a webhook is set up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub webhook_url: String,
    pub channel_id: Option<u64>,
    pub ping_role_id: Option<u64>,
}

impl WebhookTarget {
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel_id: None,
            ping_role_id: None,
        }
    }

    #[must_use]
    pub const fn in_channel(mut self, channel_id: u64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    #[must_use]
    pub const fn pinging(mut self, role_id: Option<u64>) -> Self {
        self.ping_role_id = role_id;
        self
    }
}

/// Aggregate counts over the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Configurations currently enabled
    pub enabled_webhooks: u64,
    /// Guilds with at least one configuration
    pub guilds_with_webhooks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_is_enabled_and_unchecked() {
        let target = WebhookTarget::new("https://discord.com/api/webhooks/1/abc")
            .in_channel(7)
            .pinging(Some(9));
        let config = WebhookConfig::new(1, ServiceName::Vercel, target);

        assert!(config.enabled);
        assert!(config.last_status.is_none());
        assert_eq!(config.channel_id, Some(7));
        assert_eq!(config.ping_role_id, Some(9));
    }

    #[test]
    fn test_has_changed() {
        let mut config = WebhookConfig::new(1, ServiceName::Netlify, WebhookTarget::new("url"));
        // First check always counts as a change
        assert!(config.has_changed(ServiceStatus::Operational));

        config.last_status = Some(ServiceStatus::Operational);
        assert!(!config.has_changed(ServiceStatus::Operational));
        assert!(config.has_changed(ServiceStatus::Outage));
    }

    #[test]
    fn test_display() {
        let mut config = WebhookConfig::new(5, ServiceName::Cloudflare, WebhookTarget::new("url"));
        assert_eq!(config.to_string(), "cloudflare webhook for guild 5 (enabled)");
        config.enabled = false;
        assert_eq!(config.to_string(), "cloudflare webhook for guild 5 (disabled)");
    }
}
