//! SQLite-backed webhook store using sqlx.

use crate::status::{ServiceName, ServiceStatus};
use crate::webhook::{
    ConfigStore, StoreError, StoreResult, StoreStats, WebhookConfig, WebhookTarget,
};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS webhooks (
    guild_id     INTEGER NOT NULL,
    service      TEXT    NOT NULL,
    webhook_url  TEXT    NOT NULL,
    channel_id   INTEGER,
    ping_role_id INTEGER,
    enabled      INTEGER NOT NULL DEFAULT 1,
    last_status  TEXT,
    PRIMARY KEY (guild_id, service)
)";

const SELECT_COLUMNS: &str =
    "SELECT guild_id, service, webhook_url, channel_id, ping_role_id, enabled, last_status FROM webhooks";

/// Webhook configurations persisted in a single SQLite table
#[derive(Clone)]
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    /// Open (creating if needed) the database at `database_url` and its table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` if the URL is invalid, the file or its
    /// directory cannot be created, or the table cannot be created.
    pub async fn open(database_url: &str) -> StoreResult<Self> {
        if database_url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        if let Some(dir) = options.get_filename().parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(sqlx::Error::Io)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.create_table().await?;
        info!("Opened webhook store at {database_url}");
        Ok(store)
    }

    /// A private in-memory database, gone when the store is dropped
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` if SQLite cannot be initialised.
    pub async fn in_memory() -> StoreResult<Self> {
        // Each in-memory connection is its own database, so pin the pool to one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        let store = Self { pool };
        store.create_table().await?;
        Ok(store)
    }

    async fn create_table(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

// Snowflakes are stored bit-for-bit in SQLite's signed INTEGER
const fn to_sql(id: u64) -> i64 {
    id as i64
}

const fn from_sql(id: i64) -> u64 {
    id as u64
}

fn config_from_row(row: &SqliteRow) -> StoreResult<WebhookConfig> {
    let service: String = row.try_get("service")?;
    let service = ServiceName::from_str(&service).map_err(StoreError::Corrupt)?;

    let last_status = row
        .try_get::<Option<String>, _>("last_status")?
        .map(|status| ServiceStatus::from_str(&status))
        .transpose()
        .map_err(StoreError::Corrupt)?;

    Ok(WebhookConfig {
        guild_id: from_sql(row.try_get("guild_id")?),
        service,
        webhook_url: row.try_get("webhook_url")?,
        channel_id: row.try_get::<Option<i64>, _>("channel_id")?.map(from_sql),
        ping_role_id: row.try_get::<Option<i64>, _>("ping_role_id")?.map(from_sql),
        enabled: row.try_get("enabled")?,
        last_status,
    })
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn upsert(
        &self,
        guild_id: u64,
        service: ServiceName,
        target: WebhookTarget,
    ) -> StoreResult<WebhookConfig> {
        sqlx::query(
            "INSERT INTO webhooks (guild_id, service, webhook_url, channel_id, ping_role_id, enabled, last_status)
             VALUES (?, ?, ?, ?, ?, 1, NULL)
             ON CONFLICT(guild_id, service) DO UPDATE SET
                webhook_url = excluded.webhook_url,
                channel_id = excluded.channel_id,
                ping_role_id = excluded.ping_role_id,
                enabled = 1,
                last_status = NULL",
        )
        .bind(to_sql(guild_id))
        .bind(service.as_str())
        .bind(&target.webhook_url)
        .bind(target.channel_id.map(to_sql))
        .bind(target.ping_role_id.map(to_sql))
        .execute(&self.pool)
        .await?;

        Ok(WebhookConfig::new(guild_id, service, target))
    }

    async fn get(&self, guild_id: u64, service: ServiceName) -> StoreResult<Option<WebhookConfig>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE guild_id = ? AND service = ?"))
            .bind(to_sql(guild_id))
            .bind(service.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(config_from_row).transpose()
    }

    async fn set_enabled(
        &self,
        guild_id: u64,
        service: ServiceName,
        enabled: bool,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE webhooks SET enabled = ? WHERE guild_id = ? AND service = ?")
            .bind(enabled)
            .bind(to_sql(guild_id))
            .bind(service.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { guild_id, service });
        }
        Ok(())
    }

    async fn remove(&self, guild_id: u64, service: ServiceName) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM webhooks WHERE guild_id = ? AND service = ?")
            .bind(to_sql(guild_id))
            .bind(service.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { guild_id, service });
        }
        Ok(())
    }

    async fn list_for_guild(&self, guild_id: u64) -> StoreResult<Vec<WebhookConfig>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE guild_id = ? ORDER BY service"))
            .bind(to_sql(guild_id))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(config_from_row).collect()
    }

    async fn list_enabled_by_service(
        &self,
        service: ServiceName,
    ) -> StoreResult<Vec<WebhookConfig>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE service = ? AND enabled = 1 ORDER BY guild_id"
        ))
        .bind(service.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(config_from_row).collect()
    }

    async fn update_last_status(
        &self,
        read: &WebhookConfig,
        status: ServiceStatus,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE webhooks SET last_status = ?
             WHERE guild_id = ? AND service = ? AND webhook_url = ?",
        )
        .bind(status.as_str())
        .bind(to_sql(read.guild_id))
        .bind(read.service.as_str())
        .bind(&read.webhook_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                guild_id: read.guild_id,
                service: read.service,
            });
        }
        Ok(())
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM webhooks WHERE enabled = 1) AS enabled_webhooks,
                (SELECT COUNT(DISTINCT guild_id) FROM webhooks) AS guilds_with_webhooks",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            enabled_webhooks: from_sql(row.try_get("enabled_webhooks")?),
            guilds_with_webhooks: from_sql(row.try_get("guilds_with_webhooks")?),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Webhook store closed");
    }
}
