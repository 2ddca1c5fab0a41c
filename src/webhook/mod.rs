//! Webhook configuration store
//!
//! One configuration per (guild, service) pair, persisted so it survives
//! restarts. Commands write it; the broadcaster reads it every tick and
//! records the last status it observed.

mod error;
mod record;
mod sqlite;
mod store;

pub use error::{StoreError, StoreResult};
pub use record::{StoreStats, WebhookConfig, WebhookTarget};
pub use sqlite::SqliteConfigStore;
#[cfg(test)]
pub use store::MockConfigStore;
pub use store::ConfigStore;
