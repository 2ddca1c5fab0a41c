//! Persistence trait for webhook configurations

use crate::status::{ServiceName, ServiceStatus};
use crate::webhook::{StoreResult, StoreStats, WebhookConfig, WebhookTarget};
use async_trait::async_trait;

/// Durable mapping from (guild, service) to a webhook configuration.
///
/// Every mutation is committed before the call returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Create or replace the configuration for the pair. The result is
    /// enabled and has no last status.
    async fn upsert(
        &self,
        guild_id: u64,
        service: ServiceName,
        target: WebhookTarget,
    ) -> StoreResult<WebhookConfig>;

    async fn get(&self, guild_id: u64, service: ServiceName) -> StoreResult<Option<WebhookConfig>>;

    /// Fails with `NotFound` if the pair has no configuration
    async fn set_enabled(&self, guild_id: u64, service: ServiceName, enabled: bool)
    -> StoreResult<()>;

    /// Fails with `NotFound` if the pair has no configuration
    async fn remove(&self, guild_id: u64, service: ServiceName) -> StoreResult<()>;

    async fn list_for_guild(&self, guild_id: u64) -> StoreResult<Vec<WebhookConfig>>;

    /// Enabled configurations for a service, read from committed state
    async fn list_enabled_by_service(&self, service: ServiceName)
    -> StoreResult<Vec<WebhookConfig>>;

    /// Record the last observed status on the configuration `read` was
    /// loaded from. Never creates a row: fails with `NotFound` when that
    /// configuration was removed or replaced with a new webhook since.
    async fn update_last_status(&self, read: &WebhookConfig, status: ServiceStatus)
    -> StoreResult<()>;

    async fn stats(&self) -> StoreResult<StoreStats>;

    /// Flush and release the underlying storage
    async fn close(&self);
}
