//! Startup configuration for the winners application shells.
//!
//! # Responsibility
//! - Resolve the store path and logging settings once at startup.
//!
//! # Invariants
//! - Blank overrides are ignored and fall back to defaults.
//! - Resolution never fails; bad logging values surface at `init_logging`.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Store file used when no override is given.
pub const DEFAULT_DB_FILE_NAME: &str = "motogp_database.db";
/// Directory name under the system temp dir used for logs by default.
pub const DEFAULT_LOG_DIR_NAME: &str = "motogp-logs";

pub const DB_PATH_ENV: &str = "MOTOGP_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "MOTOGP_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MOTOGP_LOG_DIR";

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl AppConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, DEFAULT_DB_FILE_NAME, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert!(config.log_dir.is_absolute());
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn overrides_win_and_blank_values_are_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /data/winners.db "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "   "),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/winners.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, AppConfig::default().log_dir);
    }
}
