//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank or unparsable values fall back to defaults; resolution never fails.
//! - A configured API URL selects the remote backend.

use crate::editor::debounce::DEFAULT_QUIET_PERIOD;
use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "CURRICULUM_DB_PATH";
pub const API_URL_ENV: &str = "CURRICULUM_API_URL";
pub const LOG_LEVEL_ENV: &str = "CURRICULUM_LOG_LEVEL";
pub const DEBOUNCE_MS_ENV: &str = "CURRICULUM_DEBOUNCE_MS";

const DEFAULT_DB_FILE_NAME: &str = "curriculum_store.sqlite3";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub api_url: Option<String>,
    pub log_level: &'static str,
    pub debounce: Duration,
    pub request_timeout: Duration,
}

/// Where the curriculum tree lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Local { db_path: PathBuf },
    Remote { api_url: String, timeout: Duration },
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            api_url: None,
            log_level: default_log_level(),
            debounce: DEFAULT_QUIET_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which returns the raw value
    /// of an environment-style key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            api_url: value(API_URL_ENV),
            log_level: value(LOG_LEVEL_ENV)
                .and_then(|raw| normalize_level(&raw).ok())
                .unwrap_or(defaults.log_level),
            debounce: value(DEBOUNCE_MS_ENV)
                .and_then(|raw| raw.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            request_timeout: defaults.request_timeout,
        }
    }

    pub fn backend(&self) -> StoreBackend {
        match &self.api_url {
            Some(api_url) => StoreBackend::Remote {
                api_url: api_url.clone(),
                timeout: self.request_timeout,
            },
            None => StoreBackend::Local {
                db_path: self.db_path.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, StoreBackend, API_URL_ENV, DEBOUNCE_MS_ENV, DB_PATH_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> CoreConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_local_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert!(matches!(config.backend(), StoreBackend::Local { .. }));
    }

    #[test]
    fn api_url_selects_remote_backend() {
        let config = config_from(&[
            (API_URL_ENV, " http://localhost:3000 "),
            (DB_PATH_ENV, "/tmp/curriculum.db"),
            (LOG_LEVEL_ENV, "WARNING"),
            (DEBOUNCE_MS_ENV, "250"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/curriculum.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.debounce, Duration::from_millis(250));
        match config.backend() {
            StoreBackend::Remote { api_url, .. } => assert_eq!(api_url, "http://localhost:3000"),
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[(LOG_LEVEL_ENV, "verbose"), (DEBOUNCE_MS_ENV, "soon")]);
        let defaults = CoreConfig::default();
        assert_eq!(config.log_level, defaults.log_level);
        assert_eq!(config.debounce, defaults.debounce);
    }
}
