//! Host configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - Resolution never fails; every field has a usable default except
//!   `log_dir`, which leaves logging off when absent.

use crate::logging::default_log_level;
use crate::service::persistence::DEFAULT_SLOT_KEY;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LAZYCAL_DB_PATH";
pub const ENV_SLOT_KEY: &str = "LAZYCAL_SLOT_KEY";
pub const ENV_LOG_LEVEL: &str = "LAZYCAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LAZYCAL_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "lazycal.sqlite3";

/// Settings shared by the FFI and CLI hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub slot_key: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup` instead of the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: read(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            slot_key: read(ENV_SLOT_KEY).unwrap_or(defaults.slot_key),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}
