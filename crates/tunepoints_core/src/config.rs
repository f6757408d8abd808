//! Runtime settings for hosts embedding the core.
//!
//! Settings are plain values passed in by the host; `from_env` is a
//! convenience for the CLI and local runs.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "TUNEPOINTS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TUNEPOINTS_LOG_DIR";
pub const ENV_DB_PATH: &str = "TUNEPOINTS_DB_PATH";

/// Host-provided settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Database file. `None` uses an in-memory database.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads `TUNEPOINTS_*` variables; unset or blank values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config.db_path = read(ENV_DB_PATH).map(PathBuf::from);
        config
    }
}
