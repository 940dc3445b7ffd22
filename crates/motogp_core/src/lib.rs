//! Core domain logic for the race-winners form application.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::race_winner::{
    RaceClass, RaceWinner, RaceWinnerKey, RaceWinnerValidationError, SEASON_MAX, SEASON_MIN,
};
pub use repo::race_winner_repo::{
    RaceWinnerRepository, RepoError, RepoResult, SqliteRaceWinnerRepository, WinnerListQuery,
    CLASS_FILTER_ALL,
};
pub use service::form_controller::{
    delete_prompt, open_failure_notice, FormController, FormError, FormField, FormFields,
    FormState, Notice, SelectionAction, Severity, WriteAction,
};
pub use service::intent::{Intent, IntentKind, IntentParseError, INTENT_TABLE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
