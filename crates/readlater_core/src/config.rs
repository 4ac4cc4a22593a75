//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve storage, logging and auth settings with stable defaults.
//! - Keep environment access behind a lookup function so resolution is
//!   testable without mutating process state.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Malformed values are rejected instead of silently replaced.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "READLATER_DB_PATH";
pub const ENV_LOG_DIR: &str = "READLATER_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "READLATER_LOG_LEVEL";
pub const ENV_AUTH_ENDPOINT: &str = "READLATER_AUTH_ENDPOINT";
pub const ENV_AUTH_PROJECT: &str = "READLATER_AUTH_PROJECT";
pub const ENV_AUTH_TIMEOUT_SECS: &str = "READLATER_AUTH_TIMEOUT_SECS";

pub const DEFAULT_AUTH_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";
const DEFAULT_DB_FILE_NAME: &str = "readlater.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "readlater-logs";
const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for the hosted account backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub endpoint: String,
    /// Required by the gateway; `None` disables remote auth.
    pub project_id: Option<String>,
    pub timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            project_id: None,
            timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub auth: AuthConfig,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_dir = read(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        let timeout = match read(ENV_AUTH_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_AUTH_TIMEOUT_SECS,
                        value: raw,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
            None => DEFAULT_AUTH_TIMEOUT,
        };

        Ok(Self {
            db_path,
            log_dir,
            log_level,
            auth: AuthConfig {
                endpoint: read(ENV_AUTH_ENDPOINT)
                    .unwrap_or_else(|| DEFAULT_AUTH_ENDPOINT.to_string()),
                project_id: read(ENV_AUTH_PROJECT),
                timeout,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, DEFAULT_AUTH_ENDPOINT, ENV_AUTH_PROJECT, ENV_AUTH_TIMEOUT_SECS,
        ENV_DB_PATH,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn resolve(vars: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = resolve(&[]).unwrap();
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("readlater.sqlite3")
        );
        assert_eq!(config.auth.endpoint, DEFAULT_AUTH_ENDPOINT);
        assert_eq!(config.auth.project_id, None);
        assert_eq!(config.auth.timeout, Duration::from_secs(15));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = resolve(&[(ENV_DB_PATH, "   "), (ENV_AUTH_PROJECT, "")]).unwrap();
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("readlater.sqlite3")
        );
        assert_eq!(config.auth.project_id, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = resolve(&[
            (ENV_DB_PATH, "/data/items.sqlite3"),
            (ENV_AUTH_PROJECT, "proj-1"),
            (ENV_AUTH_TIMEOUT_SECS, "3"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/items.sqlite3"));
        assert_eq!(config.auth.project_id.as_deref(), Some("proj-1"));
        assert_eq!(config.auth.timeout, Duration::from_secs(3));
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = resolve(&[(ENV_AUTH_TIMEOUT_SECS, "soon")]).unwrap_err();
        assert!(err.to_string().contains(ENV_AUTH_TIMEOUT_SECS));
    }
}
