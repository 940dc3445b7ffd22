//! FFI use-case API for the Flutter desktop shell.
//!
//! # Responsibility
//! - Expose the form controller intents to Dart via FRB.
//! - Own the single process-wide form session and its store connection.
//! - Flatten controller state into plain snapshot structs after every call.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - At most one session is open; `app_open` replaces any previous one.
//! - Dart never receives raw store errors, only notice envelopes.

use log::{info, warn};
use motogp_core::{
    core_version as core_version_inner, delete_prompt, init_logging as init_logging_inner,
    open_failure_notice, AppConfig, FormController, FormError, FormFields, FormState, Notice,
    RaceClass, RaceWinner, Severity, SqliteRaceWinnerRepository,
};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

type Session = FormController<SqliteRaceWinnerRepository>;

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One displayed table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerRow {
    pub season: i64,
    pub circuit: String,
    pub class: String,
    pub rider: String,
    pub constructor: String,
    pub country: String,
}

/// Form field values as shown in the edit panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub season: String,
    pub circuit: String,
    /// Class label; must be one of `class_labels()`.
    pub class: String,
    pub rider: String,
    pub constructor: String,
    pub country: String,
}

/// Modal notification to show (`info|warning|critical`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub severity: String,
    pub title: String,
    pub message: String,
}

/// Everything the window needs to render after a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub rows: Vec<WinnerRow>,
    /// `"All"` followed by classes present in the store.
    pub class_options: Vec<String>,
    /// `""` followed by countries present in the store.
    pub country_options: Vec<String>,
    pub search_text: String,
    pub class_filter: String,
    pub fields: FormInput,
    /// Whether a row is loaded; update/delete buttons follow this flag.
    pub loaded: bool,
    pub status: String,
}

/// Result envelope for every form call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub ok: bool,
    /// Present when the shell should raise a dialog.
    pub notice: Option<NoticeView>,
    pub snapshot: FormSnapshot,
}

/// Class labels for the class dropdown, first entry is the default.
#[flutter_rust_bridge::frb(sync)]
pub fn class_labels() -> Vec<String> {
    RaceClass::ALL
        .iter()
        .map(|class| class.label().to_string())
        .collect()
}

/// Opens the store and loads the initial rows and filter options.
///
/// `db_path = None` falls back to the configured default store file.
///
/// # FFI contract
/// - Closes a previously opened session first.
/// - On failure `ok=false` with a critical notice; the shell is expected to
///   show it and exit.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(db_path: Option<String>) -> FormResponse {
    let path = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| AppConfig::from_env().db_path);

    let mut guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(mut previous) = guard.take() {
        if let Err(err) = previous.close() {
            warn!("event=app_open module=ffi status=warn detail=previous_close_failed error={err}");
        }
    }

    let repo = match SqliteRaceWinnerRepository::open(&path) {
        Ok(repo) => repo,
        Err(err) => {
            warn!("event=app_open module=ffi status=error error_code=db_open_failed");
            return failure_without_session(open_failure_notice(&err));
        }
    };

    let mut session = FormController::new(repo);
    let result = session.reload().map(|_| None);
    let response = respond(&session, result);
    if response.ok {
        info!("event=app_open module=ffi status=ok");
        *guard = Some(session);
    }
    response
}

/// Closes the session and its store connection.
///
/// # FFI contract
/// - Idempotent; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn app_close() -> String {
    let mut guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(mut session) = guard.take() else {
        return String::new();
    };
    match session.close() {
        Ok(()) => String::new(),
        Err(err) => {
            let message = err.to_string();
            *guard = Some(session);
            message
        }
    }
}

/// Returns the current form state without side effects.
#[flutter_rust_bridge::frb(sync)]
pub fn form_snapshot() -> FormResponse {
    with_session(|_| Ok(None))
}

/// Search text changed.
#[flutter_rust_bridge::frb(sync)]
pub fn form_search(text: String) -> FormResponse {
    with_session(|session| session.search_changed(text).map(|_| None))
}

/// Class filter changed.
#[flutter_rust_bridge::frb(sync)]
pub fn form_filter(class_filter: String) -> FormResponse {
    with_session(|session| session.filter_changed(class_filter).map(|_| None))
}

/// Table row clicked.
#[flutter_rust_bridge::frb(sync)]
pub fn form_select_row(index: u32) -> FormResponse {
    with_session(|session| session.select_row(index as usize).map(|_| None))
}

/// Add button pressed with the current field values.
#[flutter_rust_bridge::frb(sync)]
pub fn form_add(fields: FormInput) -> FormResponse {
    with_session(|session| session.add(to_form_fields(&fields)?).map(Some))
}

/// Update button pressed with the current field values.
#[flutter_rust_bridge::frb(sync)]
pub fn form_update(fields: FormInput) -> FormResponse {
    with_session(|session| session.update(to_form_fields(&fields)?).map(Some))
}

/// Confirmation text for deleting the loaded row, if one is loaded.
#[flutter_rust_bridge::frb(sync)]
pub fn form_delete_prompt() -> Option<String> {
    let guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref()?.state() {
        FormState::Loaded(key) => Some(delete_prompt(key)),
        FormState::Empty => None,
    }
}

/// Delete button pressed; `confirmed` carries the dialog answer.
///
/// # FFI contract
/// - `confirmed=false` is a successful no-op without notice.
#[flutter_rust_bridge::frb(sync)]
pub fn form_delete(confirmed: bool) -> FormResponse {
    with_session(|session| session.delete_with(|_| confirmed))
}

/// Clear button pressed.
#[flutter_rust_bridge::frb(sync)]
pub fn form_clear() -> FormResponse {
    with_session(|session| {
        session.clear();
        Ok(None)
    })
}

fn with_session(
    f: impl FnOnce(&mut Session) -> Result<Option<Notice>, FormError>,
) -> FormResponse {
    let mut guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(session) = guard.as_mut() else {
        return failure_without_session(Notice::new(
            Severity::Critical,
            "Database Error",
            "Database is not open.",
        ));
    };
    let result = f(session);
    respond(session, result)
}

fn respond(session: &Session, result: Result<Option<Notice>, FormError>) -> FormResponse {
    let (ok, notice) = match result {
        Ok(notice) => (true, notice),
        Err(err) => (false, Some(err.notice())),
    };
    FormResponse {
        ok,
        notice: notice.map(to_notice_view),
        snapshot: to_snapshot(session),
    }
}

fn failure_without_session(notice: Notice) -> FormResponse {
    FormResponse {
        ok: false,
        notice: Some(to_notice_view(notice)),
        snapshot: FormSnapshot::default(),
    }
}

fn to_form_fields(input: &FormInput) -> Result<FormFields, FormError> {
    Ok(FormFields {
        season: input.season.clone(),
        circuit: input.circuit.clone(),
        class: input.class.trim().parse::<RaceClass>()?,
        rider: input.rider.clone(),
        constructor: input.constructor.clone(),
        country: input.country.clone(),
    })
}

fn to_form_input(fields: &FormFields) -> FormInput {
    FormInput {
        season: fields.season.clone(),
        circuit: fields.circuit.clone(),
        class: fields.class.label().to_string(),
        rider: fields.rider.clone(),
        constructor: fields.constructor.clone(),
        country: fields.country.clone(),
    }
}

fn to_winner_row(winner: &RaceWinner) -> WinnerRow {
    WinnerRow {
        season: winner.season,
        circuit: winner.circuit.clone(),
        class: winner.class.label().to_string(),
        rider: winner.rider.clone(),
        constructor: winner.constructor.clone(),
        country: winner.country.clone(),
    }
}

fn to_snapshot(session: &Session) -> FormSnapshot {
    FormSnapshot {
        rows: session.rows().iter().map(to_winner_row).collect(),
        class_options: session.class_options().to_vec(),
        country_options: session.country_options().to_vec(),
        search_text: session.search_text().to_string(),
        class_filter: session.class_filter().to_string(),
        fields: to_form_input(session.fields()),
        loaded: matches!(session.state(), FormState::Loaded(_)),
        status: session.status().to_string(),
    }
}

fn to_notice_view(notice: Notice) -> NoticeView {
    let severity = match notice.severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Critical => "critical",
    };
    NoticeView {
        severity: severity.to_string(),
        title: notice.title.to_string(),
        message: notice.message,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        app_close, app_open, class_labels, core_version, form_add, form_clear, form_delete,
        form_delete_prompt, form_filter, form_search, form_select_row, form_snapshot,
        form_update, init_logging, FormInput,
    };
    use std::sync::{Mutex, MutexGuard, PoisonError};

    // The session is process-wide; tests touching it run one at a time.
    static SESSION_TEST_LOCK: Mutex<()> = Mutex::new(());

    struct OpenSession {
        _dir: tempfile::TempDir,
        _lock: MutexGuard<'static, ()>,
    }

    impl Drop for OpenSession {
        fn drop(&mut self) {
            app_close();
        }
    }

    fn open_session() -> OpenSession {
        let lock = SESSION_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("motogp_database.db");
        let response = app_open(Some(path.to_string_lossy().into_owned()));
        assert!(response.ok, "{:?}", response.notice);
        OpenSession {
            _dir: dir,
            _lock: lock,
        }
    }

    fn input(season: &str, circuit: &str, class: &str, rider: &str) -> FormInput {
        FormInput {
            season: season.to_string(),
            circuit: circuit.to_string(),
            class: class.to_string(),
            rider: rider.to_string(),
            constructor: "Yamaha".to_string(),
            country: "France".to_string(),
        }
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn class_labels_start_with_default_class() {
        let labels = class_labels();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "MotoGP");
    }

    #[test]
    fn calls_without_session_return_critical_notice() {
        let _lock = SESSION_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        app_close();

        let response = form_snapshot();
        assert!(!response.ok);
        let notice = response.notice.expect("notice expected");
        assert_eq!(notice.severity, "critical");
        assert_eq!(form_delete_prompt(), None);
    }

    #[test]
    fn app_open_reports_connection_error_for_unopenable_path() {
        let _lock = SESSION_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().expect("temp dir");

        let response = app_open(Some(dir.path().to_string_lossy().into_owned()));
        assert!(!response.ok);
        let notice = response.notice.expect("notice expected");
        assert_eq!(notice.severity, "critical");
        assert_eq!(notice.title, "Database Connection Error");

        let after = form_snapshot();
        assert!(!after.ok);
        assert_eq!(after.notice.expect("no session").message, "Database is not open.");
    }

    #[test]
    fn add_select_update_delete_flow() {
        let _session = open_session();

        let added = form_add(input(
            "2021",
            "Algarve International Circuit",
            "MotoGP",
            "Fabio Quartararo",
        ));
        assert!(added.ok, "{:?}", added.notice);
        assert_eq!(added.snapshot.rows.len(), 1);
        assert_eq!(added.snapshot.country_options, vec!["", "France"]);
        assert!(!added.snapshot.loaded);

        let searched = form_search("Algarve".to_string());
        assert_eq!(searched.snapshot.rows.len(), 1);

        let selected = form_select_row(0);
        assert!(selected.snapshot.loaded);
        assert_eq!(selected.snapshot.fields.season, "2021");
        assert_eq!(
            form_delete_prompt().as_deref(),
            Some(
                "Are you sure you want to delete entry for: Fabio Quartararo (Algarve International Circuit, 2021)?"
            )
        );

        let mut edited = selected.snapshot.fields.clone();
        edited.circuit = "Algarve".to_string();
        let updated = form_update(edited);
        assert!(updated.ok, "{:?}", updated.notice);
        assert_eq!(updated.snapshot.rows[0].circuit, "Algarve");

        let filtered = form_filter("MotoGP".to_string());
        assert_eq!(filtered.snapshot.class_filter, "MotoGP");

        form_select_row(0);
        let declined = form_delete(false);
        assert!(declined.ok);
        assert!(declined.notice.is_none());
        assert_eq!(declined.snapshot.rows.len(), 1);

        let deleted = form_delete(true);
        assert!(deleted.ok);
        assert!(deleted.snapshot.rows.is_empty());
        assert_eq!(
            deleted.notice.expect("delete notice").message,
            "Entry deleted successfully!"
        );
    }

    #[test]
    fn invalid_input_returns_warning_and_keeps_fields() {
        let _session = open_session();

        let response = form_add(input("20x1", "Jerez", "MotoGP", "Rider"));
        assert!(!response.ok);
        let notice = response.notice.expect("notice expected");
        assert_eq!(notice.severity, "warning");
        assert_eq!(notice.message, "Season must be a valid number.");
        assert_eq!(response.snapshot.fields.season, "20x1");

        let unknown_class = form_add(input("2021", "Jerez", "Superbike", "Rider"));
        assert!(!unknown_class.ok);

        let update_without_selection = form_update(input("2021", "Jerez", "MotoGP", "Rider"));
        assert_eq!(
            update_without_selection.notice.expect("notice").title,
            "Selection Error"
        );

        let cleared = form_clear();
        let expected = FormInput {
            class: "MotoGP".to_string(),
            ..FormInput::default()
        };
        assert_eq!(cleared.snapshot.fields, expected);
    }
}
