//! Outbound webhook notifications

use crate::broadcast::DeliveryError;
use crate::status::{ServiceStatus, StatusReport, embed};
use crate::webhook::WebhookConfig;
use poise::serenity_prelude::{CreateEmbed, ExecuteWebhook, Http, WebhookId};
use serenity::utils::parse_webhook;
use std::sync::Arc;

/// Username the webhooks post under
pub const WEBHOOK_USERNAME: &str = "Status Relay";

/// A status change about to be posted to one webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Status stored before this change, `None` on the first check
    pub previous: Option<ServiceStatus>,
    pub report: StatusReport,
    pub ping_role_id: Option<u64>,
}

impl Notification {
    #[must_use]
    pub fn for_config(config: &WebhookConfig, report: StatusReport) -> Self {
        Self {
            previous: config.last_status,
            report,
            ping_role_id: config.ping_role_id,
        }
    }

    /// Plain-text content, only present when a role should be pinged
    #[must_use]
    pub fn content(&self) -> Option<String> {
        self.ping_role_id.map(|role_id| {
            format!(
                "<@&{role_id}> {} status update!",
                self.report.service.display_name()
            )
        })
    }

    #[must_use]
    pub fn embed(&self) -> CreateEmbed {
        embed::status_embed(&self.report).field(
            "Status Change",
            embed::transition_text(self.previous, self.report.status),
            true,
        )
    }
}

/// Posts notifications to webhook URLs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WebhookSender: Send + Sync {
    async fn deliver(&self, url: &str, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Delivers notifications through Discord's webhook API
#[derive(Clone)]
pub struct SerenityWebhookSender {
    http: Arc<Http>,
}

impl SerenityWebhookSender {
    #[must_use]
    pub const fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl WebhookSender for SerenityWebhookSender {
    async fn deliver(&self, url: &str, notification: &Notification) -> Result<(), DeliveryError> {
        let (webhook_id, token) = webhook_credentials(url)?;

        let mut builder = ExecuteWebhook::new()
            .username(WEBHOOK_USERNAME)
            .embed(notification.embed());
        if let Some(content) = notification.content() {
            builder = builder.content(content);
        }

        self.http
            .execute_webhook(webhook_id, None, &token, false, Vec::new(), &builder)
            .await?;
        Ok(())
    }
}

/// Split a stored webhook URL into its id and token without asking Discord
fn webhook_credentials(url: &str) -> Result<(WebhookId, String), DeliveryError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| DeliveryError::InvalidUrl(e.to_string()))?;
    parse_webhook(&parsed)
        .map(|(id, token)| (id, token.to_string()))
        .ok_or_else(|| DeliveryError::InvalidUrl("not a Discord webhook URL".to_string()))
}
