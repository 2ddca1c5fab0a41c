//! Status broadcaster for Status Relay
//!
//! A single recurring task that detects status changes and fans them out to
//! the configured webhooks.

mod error;
mod sender;
mod service;
mod ticker;

pub use error::DeliveryError;
#[cfg(test)]
pub use sender::MockWebhookSender;
pub use sender::{Notification, SerenityWebhookSender, WEBHOOK_USERNAME, WebhookSender};
pub use service::{
    BroadcastRequest, Broadcaster, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENT_DELIVERIES,
    DEFAULT_TICK_BUDGET, TickReport,
};
pub use ticker::{IntervalTicker, Ticker};
