//! Error types for the webhook configuration store

use crate::status::ServiceName;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No configuration exists for the (guild, service) pair
    #[error("No {service} webhook configured for guild {guild_id}")]
    NotFound { guild_id: u64, service: ServiceName },

    /// The database could not be reached or rejected the statement
    #[error("Webhook store unavailable: {0}")]
    Persistence(#[from] sqlx::Error),

    /// A persisted value could not be read back
    #[error("Corrupt webhook row: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether the error only says the row is missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
