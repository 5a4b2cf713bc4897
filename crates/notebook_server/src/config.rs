//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Read `NOTEBOOK_*` variables (after `.env` loading in `main`).
//! - Apply defaults and reject malformed values up front.

use notebook_core::lookup::{DEFAULT_LOOKUP_TIMEOUT, WIKIPEDIA_API_ENDPOINT};
use notebook_core::{default_log_level, normalize_level, normalize_log_dir, LogSettings};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BIND_ADDR: &str = "NOTEBOOK_BIND_ADDR";
pub const ENV_SNAPSHOT_PATH: &str = "NOTEBOOK_SNAPSHOT_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEBOOK_LOG_DIR";
pub const ENV_LOG_STDERR: &str = "NOTEBOOK_LOG_STDERR";
pub const ENV_LOOKUP_ENDPOINT: &str = "NOTEBOOK_LOOKUP_ENDPOINT";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "NOTEBOOK_LOOKUP_TIMEOUT_SECS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SNAPSHOT_PATH: &str = "notes.json";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, details: String },
    WorkingDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, details } => write!(f, "invalid `{key}`: {details}"),
            Self::WorkingDir(err) => write!(f, "cannot resolve working directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WorkingDir(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub snapshot_path: PathBuf,
    pub log_settings: LogSettings,
    pub lookup_endpoint: String,
    pub lookup_timeout: Duration,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Reads configuration from an arbitrary key lookup.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            get(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let bind_raw = value(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                key: ENV_BIND_ADDR,
                details: format!("`{bind_raw}`: {err}"),
            })?;

        let snapshot_path = PathBuf::from(
            value(ENV_SNAPSHOT_PATH).unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()),
        );

        let log_dir = match value(ENV_LOG_DIR) {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(ConfigError::WorkingDir)?
                .join(DEFAULT_LOG_DIR_NAME)
                .to_string_lossy()
                .into_owned(),
        };
        let level = value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());
        let echo_stderr = match value(ENV_LOG_STDERR).as_deref() {
            None => true,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: ENV_LOG_STDERR,
                    details: format!("`{other}` is not a boolean"),
                })
            }
        };
        let log_settings = LogSettings {
            level: normalize_level(&level).map_err(|details| ConfigError::Invalid {
                key: ENV_LOG_LEVEL,
                details,
            })?,
            log_dir: normalize_log_dir(&log_dir).map_err(|details| ConfigError::Invalid {
                key: ENV_LOG_DIR,
                details,
            })?,
            echo_stderr,
        };

        let lookup_endpoint =
            value(ENV_LOOKUP_ENDPOINT).unwrap_or_else(|| WIKIPEDIA_API_ENDPOINT.to_string());
        let lookup_timeout = match value(ENV_LOOKUP_TIMEOUT_SECS) {
            None => DEFAULT_LOOKUP_TIMEOUT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: ENV_LOOKUP_TIMEOUT_SECS,
                        details: format!("`{raw}` must be a positive number of seconds"),
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            snapshot_path,
            log_settings,
            lookup_endpoint,
            lookup_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_LOOKUP_TIMEOUT_SECS};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.snapshot_path.to_str(), Some("notes.json"));
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
        assert!(config.log_settings.log_dir.is_absolute());
        assert!(config.lookup_endpoint.contains("wikipedia.org"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("NOTEBOOK_BIND_ADDR", "0.0.0.0:9000"),
            ("NOTEBOOK_SNAPSHOT_PATH", "/var/lib/notebook/notes.json"),
            ("NOTEBOOK_LOG_LEVEL", "warning"),
            ("NOTEBOOK_LOG_DIR", "/var/log/notebook"),
            ("NOTEBOOK_LOG_STDERR", "false"),
            (ENV_LOOKUP_TIMEOUT_SECS, "3"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_settings.level, "warn");
        assert!(!config.log_settings.echo_stderr);
        assert_eq!(config.lookup_timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config_from(&[(ENV_LOOKUP_TIMEOUT_SECS, "0")]).unwrap_err();
        assert!(err.to_string().contains(ENV_LOOKUP_TIMEOUT_SECS));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = config_from(&[(ENV_LOG_DIR, "logs")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_LOG_DIR));
    }

    #[test]
    fn invalid_log_level_names_its_own_key() {
        let err = config_from(&[(ENV_LOG_LEVEL, "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_LOG_LEVEL));
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        assert!(config_from(&[("NOTEBOOK_BIND_ADDR", "localhost")]).is_err());
    }
}
