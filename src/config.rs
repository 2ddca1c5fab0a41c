//! Bot configuration
//!
//! Secrets and paths come from the environment (a `.env` file is loaded first
//! by [`load_env_file`]);
//! polling behaviour and status page URLs from an optional YAML file.

use crate::status::ServiceName;
use poise::serenity_prelude::UserId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default location of the YAML settings file
pub const CONFIG_FILE: &str = "config/status_relay.yaml";
/// Default SQLite database
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/bot_data.db";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Load a `.env` file into the process environment without overriding
/// variables already set. `None` searches the working directory and its
/// parents. Runs before logging is set up so `RUST_LOG` may come from the
/// file; returns whether a file was loaded.
pub fn load_env_file(path: Option<&Path>) -> bool {
    // A missing file is fine, the variables may come from elsewhere
    match path {
        Some(path) => dotenvy::from_path(path).is_ok(),
        None => dotenvy::dotenv().is_ok(),
    }
}

/// Settings read from the YAML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub poll_interval_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    /// Overrides for status page API roots, keyed by service
    pub status_pages: HashMap<String, String>,
}

/// Complete runtime configuration
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    /// The only user allowed to run owner commands
    pub owner_id: UserId,
    pub database_url: String,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub status_pages: HashMap<ServiceName, String>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .field("database_url", &self.database_url)
            .field("poll_interval", &self.poll_interval)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("status_pages", &self.status_pages)
            .finish()
    }
}

impl BotConfig {
    /// Load from the process environment and the YAML file it points at.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value is
    /// invalid, or the YAML file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STATUS_RELAY_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        let settings = if Path::new(&path).exists() {
            Some(std::fs::read_to_string(&path)?)
        } else {
            None
        };

        Self::from_sources(|key| std::env::var(key).ok(), settings.as_deref())
    }

    /// Build from an environment lookup and optional YAML text
    ///
    /// # Errors
    ///
    /// See [`BotConfig::load`].
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        settings: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let token = env("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let owner_id = env("OWNER_ID").ok_or(ConfigError::Missing("OWNER_ID"))?;
        let owner_id = owner_id
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::invalid("OWNER_ID", e.to_string()))?;
        if owner_id == 0 {
            return Err(ConfigError::invalid("OWNER_ID", "must not be zero"));
        }

        let database_url = env("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let settings: FileSettings = match settings {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str(text)?,
            _ => FileSettings::default(),
        };

        let poll_interval =
            Duration::from_secs(settings.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS));
        let fetch_timeout =
            Duration::from_secs(settings.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS));

        if poll_interval.is_zero() {
            return Err(ConfigError::invalid("poll_interval_secs", "must be positive"));
        }
        if fetch_timeout.is_zero() || fetch_timeout >= poll_interval {
            return Err(ConfigError::invalid(
                "fetch_timeout_secs",
                "must be positive and shorter than the poll interval",
            ));
        }

        let mut status_pages: HashMap<ServiceName, String> = ServiceName::ALL
            .iter()
            .map(|service| (*service, service.default_status_page().to_string()))
            .collect();
        for (name, url) in settings.status_pages {
            let service = name
                .parse::<ServiceName>()
                .map_err(|reason| ConfigError::invalid(format!("status_pages.{name}"), reason))?;
            status_pages.insert(service, url);
        }

        Ok(Self {
            token,
            owner_id: UserId::new(owner_id),
            database_url,
            poll_interval,
            fetch_timeout,
            status_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base_env() -> impl Fn(&str) -> Option<String> {
        env(&[("DISCORD_TOKEN", "token"), ("OWNER_ID", "1234")])
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_sources(base_env(), None).unwrap();
        assert_eq!(config.owner_id, UserId::new(1234));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.status_pages.len(), ServiceName::ALL.len());
        assert_eq!(
            config.status_pages[&ServiceName::Netlify],
            "https://www.netlifystatus.com/api/v2"
        );
    }

    #[test]
    fn test_missing_token() {
        let err = BotConfig::from_sources(env(&[("OWNER_ID", "1")]), None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_TOKEN")));
    }

    #[test]
    fn test_owner_id_must_be_nonzero_number() {
        let err = BotConfig::from_sources(env(&[("DISCORD_TOKEN", "t"), ("OWNER_ID", "0")]), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = BotConfig::from_sources(env(&[("DISCORD_TOKEN", "t"), ("OWNER_ID", "abc")]), None)
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid value for OWNER_ID"));

        let err = BotConfig::from_sources(env(&[("DISCORD_TOKEN", "t")]), None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OWNER_ID")));
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = "
poll_interval_secs: 120
fetch_timeout_secs: 5
status_pages:
  vercel: http://localhost:8080/api/v2
";
        let config = BotConfig::from_sources(base_env(), Some(yaml)).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(120));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(
            config.status_pages[&ServiceName::Vercel],
            "http://localhost:8080/api/v2"
        );
        assert_eq!(
            config.status_pages[&ServiceName::Cloudflare],
            "https://www.cloudflarestatus.com/api/v2"
        );
    }

    #[test]
    fn test_timeout_must_be_shorter_than_interval() {
        let yaml = "poll_interval_secs: 10\nfetch_timeout_secs: 10\n";
        let err = BotConfig::from_sources(base_env(), Some(yaml)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "fetch_timeout_secs"));
    }

    #[test]
    fn test_unknown_service_in_yaml() {
        let yaml = "status_pages:\n  github: https://www.githubstatus.com/api/v2\n";
        let err = BotConfig::from_sources(base_env(), Some(yaml)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "status_pages.github"));
    }

    #[test]
    fn test_unknown_yaml_key_rejected() {
        let err = BotConfig::from_sources(base_env(), Some("poll_every: 3\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_env_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("status_relay_{}.env", std::process::id()));
        std::fs::write(&path, "STATUS_RELAY_TEST_LOG_FILTER=debug\n").unwrap();

        assert!(load_env_file(Some(path.as_path())));
        assert_eq!(
            std::env::var("STATUS_RELAY_TEST_LOG_FILTER").as_deref(),
            Ok("debug")
        );

        std::fs::remove_file(&path).unwrap();
        assert!(!load_env_file(Some(path.as_path())));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::from_sources(base_env(), None).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"token\""));
    }
}
