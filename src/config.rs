//! Server configuration read from the environment at startup.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::bills::BillSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{name} has unsupported value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where locks and idempotency records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process-local map, single instance only.
    Memory,
    /// Shared `cache_entries` table.
    Database,
    /// Locks always granted, no idempotency records.
    None,
}

/// Where bill events are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBackend {
    /// In-process broadcast channel.
    Memory,
    /// Outbox appended to the `bus_events` table.
    Database,
    None,
}

impl FromStr for CacheBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "database" | "db" => Ok(Self::Database),
            "none" | "noop" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl FromStr for EventBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "database" | "db" => Ok(Self::Database),
            "none" | "noop" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie signing secret; a random key is generated when absent.
    pub secret: Option<String>,
    pub auth_service_url: String,
    pub domain: String,
    pub cache_backend: CacheBackend,
    pub event_backend: EventBackend,
    pub event_channel_capacity: usize,
    pub bills: BillSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let auth_service_url = var("AUTH_SERVICE_URL").ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))?;

        let cache_backend = match var("CACHE_BACKEND") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "CACHE_BACKEND",
                value,
            })?,
            None => CacheBackend::Memory,
        };
        let event_backend = match var("EVENT_BUS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "EVENT_BUS",
                value,
            })?,
            None => EventBackend::Memory,
        };

        let defaults = BillSettings::default();
        let lock_ttl_ms = number(&var, "LOCK_TTL_MS", 5_000u64)?;
        let idempotency_ttl_secs = number(&var, "IDEMPOTENCY_TTL_SECS", 86_400u64)?;
        let max_save_attempts = number(&var, "MAX_SAVE_ATTEMPTS", defaults.max_save_attempts)?;

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "app.db".to_string()),
            address: var("ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: number(&var, "PORT", 8080u16)?,
            secret: var("SECRET_KEY"),
            auth_service_url,
            domain: var("DOMAIN").unwrap_or_else(|| "localhost".to_string()),
            cache_backend,
            event_backend,
            event_channel_capacity: number(&var, "EVENT_CHANNEL_CAPACITY", 256usize)?.max(1),
            bills: BillSettings {
                lock_ttl: Duration::from_millis(lock_ttl_ms),
                idempotency_ttl: Duration::from_secs(idempotency_ttl_secs),
                max_save_attempts: max_save_attempts.max(1),
            },
        })
    }
}

fn number<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config =
            ServerConfig::from_lookup(lookup(&[("AUTH_SERVICE_URL", "http://auth")])).unwrap();

        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.secret, None);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.event_backend, EventBackend::Memory);
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.bills, BillSettings::default());
    }

    #[test]
    fn auth_service_url_is_required() {
        let result = ServerConfig::from_lookup(lookup(&[]));

        assert!(matches!(
            result,
            Err(ConfigError::Missing("AUTH_SERVICE_URL"))
        ));
    }

    #[test]
    fn reads_backends_and_tunables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("AUTH_SERVICE_URL", "http://auth"),
            ("CACHE_BACKEND", "Database"),
            ("EVENT_BUS", "none"),
            ("LOCK_TTL_MS", "250"),
            ("IDEMPOTENCY_TTL_SECS", "60"),
            ("MAX_SAVE_ATTEMPTS", "5"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.cache_backend, CacheBackend::Database);
        assert_eq!(config.event_backend, EventBackend::None);
        assert_eq!(config.port, 9000);
        assert_eq!(config.bills.lock_ttl, Duration::from_millis(250));
        assert_eq!(config.bills.idempotency_ttl, Duration::from_secs(60));
        assert_eq!(config.bills.max_save_attempts, 5);
    }

    #[test]
    fn rejects_unknown_backend() {
        let result = ServerConfig::from_lookup(lookup(&[
            ("AUTH_SERVICE_URL", "http://auth"),
            ("CACHE_BACKEND", "redis"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                name: "CACHE_BACKEND",
                value: "redis".to_string()
            }
        );
    }
}
