//! Environment configuration for the HTTP server.
//!
//! Every setting has a default, so an empty environment yields a working
//! local server on port 8001 backed by `carrater.sqlite3`.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use thiserror::Error;

pub const HOST_VAR: &str = "CARRATER_HOST";
pub const PORT_VAR: &str = "CARRATER_PORT";
pub const STORE_VAR: &str = "CARRATER_STORE";
pub const DB_PATH_VAR: &str = "CARRATER_DB_PATH";
pub const SEED_VAR: &str = "CARRATER_SEED";
pub const LOG_LEVEL_VAR: &str = "CARRATER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CARRATER_LOG_DIR";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where vote tallies live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err("expected sqlite|memory".to_string()),
        }
    }
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub db_path: PathBuf,
    /// Seed the sample catalog when the store is empty.
    pub seed: bool,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: try_load(&lookup, HOST_VAR, "0.0.0.0")?,
            port: try_load(&lookup, PORT_VAR, "8001")?,
            store: try_load(&lookup, STORE_VAR, "sqlite")?,
            db_path: try_load(&lookup, DB_PATH_VAR, "carrater.sqlite3")?,
            seed: try_load_flag(&lookup, SEED_VAR, true)?,
            log_level: lookup(LOG_LEVEL_VAR)
                .unwrap_or_else(|| carrater_core::default_log_level().to_string()),
            log_dir: lookup(LOG_DIR_VAR).filter(|dir| !dir.trim().is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());

    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: err.to_string(),
    })
}

fn try_load_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true|false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, StoreKind, PORT_VAR, SEED_VAR, STORE_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8001");
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("carrater.sqlite3"));
        assert!(config.seed);
        assert_eq!(config.log_level, carrater_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("CARRATER_HOST", "127.0.0.1"),
            (PORT_VAR, "9000"),
            (STORE_VAR, "Memory"),
            (SEED_VAR, "off"),
            ("CARRATER_LOG_DIR", "/var/log/carrater"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.store, StoreKind::Memory);
        assert!(!config.seed);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/carrater"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let port = config_from(&[(PORT_VAR, "eighty")]).unwrap_err();
        assert!(matches!(port, ConfigError::Invalid { key, .. } if key == PORT_VAR));

        let store = config_from(&[(STORE_VAR, "redis")]).unwrap_err();
        assert!(store.to_string().contains("sqlite|memory"));

        let seed = config_from(&[(SEED_VAR, "maybe")]).unwrap_err();
        assert!(matches!(seed, ConfigError::Invalid { key, .. } if key == SEED_VAR));
    }
}
