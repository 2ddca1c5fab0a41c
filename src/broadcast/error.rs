//! Webhook delivery errors

use std::time::Duration;
use thiserror::Error;

/// A notification that did not reach its webhook
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Discord rejected the webhook or could not be reached
    #[error("Discord API error: {0}")]
    DiscordApi(#[from] Box<poise::serenity_prelude::Error>),

    /// The stored URL does not name a Discord webhook
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),

    /// The delivery did not complete in time
    #[error("Webhook delivery timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<poise::serenity_prelude::Error> for DeliveryError {
    fn from(error: poise::serenity_prelude::Error) -> Self {
        Self::DiscordApi(Box::new(error))
    }
}
