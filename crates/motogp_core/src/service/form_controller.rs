//! Race-winner form controller.
//!
//! # Responsibility
//! - Mediate between the displayed record set, the edit form and the gateway.
//! - Track at most one loaded composite key (`Empty` vs `Loaded`).
//! - Validate form input before any store access.
//! - Convert every gateway failure into a presentable [`FormError`].
//!
//! # Invariants
//! - Update/delete are rejected with a selection error while `Empty`.
//! - Every successful add/update/delete resets the form to `Empty` and
//!   refreshes rows and filter options. A failed refresh after a committed
//!   write is reported as a warning, never as a failed write.
//! - A failed operation leaves the form values and state untouched.

use crate::model::race_winner::{
    parse_season, RaceClass, RaceWinner, RaceWinnerKey, RaceWinnerValidationError,
};
use crate::repo::race_winner_repo::{
    RaceWinnerRepository, RepoError, WinnerListQuery, CLASS_FILTER_ALL,
};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which operation needed a loaded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Update,
    Delete,
    /// Row index outside the displayed set.
    Select,
}

/// Which write collided with an existing composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Add,
    Update,
}

/// Failure surfaced to the presentation layer.
#[derive(Debug)]
pub enum FormError {
    Validation(RaceWinnerValidationError),
    DuplicateKey {
        action: WriteAction,
        key: RaceWinnerKey,
    },
    Selection(SelectionAction),
    Store(RepoError),
}

impl FormError {
    /// Renders this failure as a modal-style notice.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(_) | Self::DuplicateKey { .. } => {
                Notice::new(Severity::Warning, "Input Error", self.to_string())
            }
            Self::Selection(_) => {
                Notice::new(Severity::Warning, "Selection Error", self.to_string())
            }
            Self::Store(_) => Notice::new(Severity::Critical, "Database Error", self.to_string()),
        }
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey {
                action: WriteAction::Add,
                ..
            } => write!(
                f,
                "An entry with this Season, Circuit, Class, and Rider already exists. Please ensure uniqueness."
            ),
            Self::DuplicateKey {
                action: WriteAction::Update,
                ..
            } => write!(
                f,
                "An entry with the new Season, Circuit, Class, and Rider already exists. Please ensure uniqueness."
            ),
            Self::Selection(SelectionAction::Update) => {
                write!(f, "Please select an entry to update from the table.")
            }
            Self::Selection(SelectionAction::Delete) => {
                write!(f, "Please select an entry to delete from the table.")
            }
            Self::Selection(SelectionAction::Select) => {
                write!(f, "Please select a row that exists in the table.")
            }
            Self::Store(err) => write!(f, "Database operation failed: {err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::DuplicateKey { .. } | Self::Selection(_) => None,
        }
    }
}

impl From<RaceWinnerValidationError> for FormError {
    fn from(value: RaceWinnerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl FormError {
    /// Maps a failed insert/update, keeping key collisions tied to `action`.
    fn from_write(action: WriteAction, err: RepoError) -> Self {
        match err {
            RepoError::DuplicateKey(key) => Self::DuplicateKey { action, key },
            other => other.into(),
        }
    }
}

/// Collisions only come from writes, which map them via `from_write`; any
/// other source is reported as a store failure.
impl From<RepoError> for FormError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Notice severity, mapped by shells to information/warning/critical dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// User-facing modal notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, title: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            title,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, "Success", message)
    }
}

/// Editable form fields as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    /// Raw season text; parsed on submit.
    pub season: String,
    pub circuit: String,
    pub class: RaceClass,
    pub rider: String,
    pub constructor: String,
    /// Free text, pre-filled from known countries by the shell.
    pub country: String,
}

impl FormFields {
    /// Copies a record into form fields.
    pub fn from_winner(winner: &RaceWinner) -> Self {
        Self {
            season: winner.season.to_string(),
            circuit: winner.circuit.clone(),
            class: winner.class,
            rider: winner.rider.clone(),
            constructor: winner.constructor.clone(),
            country: winner.country.clone(),
        }
    }

    /// Validates and converts the form into a record.
    ///
    /// # Errors
    /// - `MissingRequiredField` when season, circuit or rider is blank.
    /// - `SeasonNotNumeric` / `SeasonOutOfRange` for a bad season.
    pub fn to_winner(&self) -> Result<RaceWinner, RaceWinnerValidationError> {
        let circuit = self.circuit.trim();
        let rider = self.rider.trim();
        if self.season.trim().is_empty() || circuit.is_empty() || rider.is_empty() {
            return Err(RaceWinnerValidationError::MissingRequiredField);
        }
        let season = parse_season(&self.season)?;
        let winner = RaceWinner::new(
            season,
            circuit,
            self.class,
            rider,
            self.constructor.trim(),
            self.country.trim(),
        );
        winner.validate()?;
        Ok(winner)
    }
}

/// Addressable form field, used by intent-driven shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Season,
    Circuit,
    Class,
    Rider,
    Constructor,
    Country,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Season,
        FormField::Circuit,
        FormField::Class,
        FormField::Rider,
        FormField::Constructor,
        FormField::Country,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Season => "season",
            Self::Circuit => "circuit",
            Self::Class => "class",
            Self::Rider => "rider",
            Self::Constructor => "constructor",
            Self::Country => "country",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|field| field.name() == lowered)
    }
}

/// Edit state of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Empty,
    /// Holds the original key of the row being edited.
    Loaded(RaceWinnerKey),
}

/// Form controller over a race-winner gateway.
pub struct FormController<R: RaceWinnerRepository> {
    repo: R,
    state: FormState,
    fields: FormFields,
    search_text: String,
    class_filter: String,
    rows: Vec<RaceWinner>,
    class_options: Vec<String>,
    country_options: Vec<String>,
    status: String,
}

impl<R: RaceWinnerRepository> FormController<R> {
    /// Creates a controller in the `Empty` state without touching the store.
    ///
    /// Call [`FormController::reload`] to populate rows and options.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: FormState::Empty,
            fields: FormFields::default(),
            search_text: String::new(),
            class_filter: CLASS_FILTER_ALL.to_string(),
            rows: Vec::new(),
            class_options: vec![CLASS_FILTER_ALL.to_string()],
            country_options: vec![String::new()],
            status: String::new(),
        }
    }

    /// Reloads filter options and rows using the current filters.
    pub fn reload(&mut self) -> Result<usize, FormError> {
        self.populate_filters()?;
        self.refresh(self.search_text.clone(), self.class_filter.clone())
    }

    /// Replaces the displayed rows with the gateway result for the filters.
    ///
    /// Returns the number of rows displayed.
    pub fn refresh(
        &mut self,
        search_text: impl Into<String>,
        class_filter: impl Into<String>,
    ) -> Result<usize, FormError> {
        let query = WinnerListQuery::new(search_text, class_filter);
        let rows = self.repo.list_winners(&query)?;
        self.search_text = query.circuit_contains;
        self.class_filter = query.class_filter;
        self.rows = rows;
        self.status = format!("Loaded {} entries.", self.rows.len());
        Ok(self.rows.len())
    }

    /// Re-queries with new search text, keeping the class filter.
    pub fn search_changed(&mut self, search_text: impl Into<String>) -> Result<usize, FormError> {
        self.refresh(search_text, self.class_filter.clone())
    }

    /// Re-queries with a new class filter, keeping the search text.
    pub fn filter_changed(&mut self, class_filter: impl Into<String>) -> Result<usize, FormError> {
        self.refresh(self.search_text.clone(), class_filter)
    }

    /// Loads the displayed row at `index` into the form.
    pub fn select_row(&mut self, index: usize) -> Result<(), FormError> {
        let winner = self
            .rows
            .get(index)
            .cloned()
            .ok_or(FormError::Selection(SelectionAction::Select))?;
        self.select_record(&winner);
        Ok(())
    }

    /// Loads `winner` into the form and remembers its key for update/delete.
    pub fn select_record(&mut self, winner: &RaceWinner) {
        self.state = FormState::Loaded(winner.key());
        self.fields = FormFields::from_winner(winner);
        self.status = format!("Loaded entry for: {} ({})", winner.rider, winner.circuit);
    }

    /// Overwrites one form field from text input.
    ///
    /// # Errors
    /// - `UnknownClass` when `field` is the class and `value` is not a label.
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        match field {
            FormField::Season => self.fields.season = value.to_string(),
            FormField::Circuit => self.fields.circuit = value.to_string(),
            FormField::Class => self.fields.class = value.trim().parse()?,
            FormField::Rider => self.fields.rider = value.to_string(),
            FormField::Constructor => self.fields.constructor = value.to_string(),
            FormField::Country => self.fields.country = value.to_string(),
        }
        Ok(())
    }

    /// Inserts a new record from `fields`.
    pub fn add(&mut self, fields: FormFields) -> Result<Notice, FormError> {
        self.fields = fields;
        let winner = self.validated_fields()?;
        self.repo
            .insert_winner(&winner)
            .map_err(|err| FormError::from_write(WriteAction::Add, err))?;
        let notice = self.after_mutation("Entry added successfully!");
        self.status = format!("Entry for '{}' added.", winner.rider);
        Ok(notice)
    }

    /// Overwrites the loaded record with `fields`.
    pub fn update(&mut self, fields: FormFields) -> Result<Notice, FormError> {
        let original = self.loaded_key(SelectionAction::Update)?;
        self.fields = fields;
        let winner = self.validated_fields()?;
        self.repo
            .update_winner(&original, &winner)
            .map_err(|err| FormError::from_write(WriteAction::Update, err))?;
        let notice = self.after_mutation("Entry updated successfully!");
        self.status = format!("Entry for '{}' updated.", winner.rider);
        Ok(notice)
    }

    /// Deletes the loaded record once `confirm` approves the key.
    ///
    /// Returns `Ok(None)` when the confirmation is declined; the form stays
    /// loaded in that case.
    pub fn delete_with(
        &mut self,
        confirm: impl FnOnce(&RaceWinnerKey) -> bool,
    ) -> Result<Option<Notice>, FormError> {
        let key = self.loaded_key(SelectionAction::Delete)?;
        if !confirm(&key) {
            debug!("event=form_delete module=service status=cancelled");
            return Ok(None);
        }
        self.repo.delete_winner(&key)?;
        let notice = self.after_mutation("Entry deleted successfully!");
        self.status = format!("Entry for {} deleted.", key.rider);
        Ok(Some(notice))
    }

    /// Resets the form to `Empty` with default field values.
    pub fn clear(&mut self) {
        self.state = FormState::Empty;
        self.fields = FormFields {
            country: self.country_options.first().cloned().unwrap_or_default(),
            ..FormFields::default()
        };
        self.status = "Form cleared.".to_string();
    }

    /// Releases the gateway connection. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<(), FormError> {
        self.repo.close()?;
        Ok(())
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn rows(&self) -> &[RaceWinner] {
        &self.rows
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn class_filter(&self) -> &str {
        &self.class_filter
    }

    /// `"All"` followed by the distinct classes present in the store.
    pub fn class_options(&self) -> &[String] {
        &self.class_options
    }

    /// `""` followed by the distinct countries present in the store.
    pub fn country_options(&self) -> &[String] {
        &self.country_options
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn loaded_key(&self, action: SelectionAction) -> Result<RaceWinnerKey, FormError> {
        match &self.state {
            FormState::Loaded(key) => Ok(key.clone()),
            FormState::Empty => Err(FormError::Selection(action)),
        }
    }

    fn validated_fields(&self) -> Result<RaceWinner, FormError> {
        self.fields.to_winner().map_err(|err| {
            warn!("event=form_validate module=service status=rejected");
            FormError::Validation(err)
        })
    }

    fn populate_filters(&mut self) -> Result<(), FormError> {
        let classes = self.repo.distinct_classes()?;
        let countries = self.repo.distinct_countries()?;

        self.class_options = std::iter::once(CLASS_FILTER_ALL.to_string())
            .chain(classes)
            .collect();
        self.country_options = std::iter::once(String::new()).chain(countries).collect();

        if !self.class_options.contains(&self.class_filter) {
            self.class_filter = CLASS_FILTER_ALL.to_string();
        }
        Ok(())
    }

    /// Resets the form and reloads after a committed write.
    ///
    /// The write already succeeded, so a failed reload only downgrades the
    /// success notice; the displayed rows keep their previous contents.
    fn after_mutation(&mut self, done: &str) -> Notice {
        self.clear();
        match self.reload() {
            Ok(_) => Notice::success(done),
            Err(err) => {
                warn!("event=form_reload module=service status=error detail=after_mutation");
                Notice::new(
                    Severity::Warning,
                    "Refresh Error",
                    format!("{done} The table could not be refreshed: {err}"),
                )
            }
        }
    }
}

/// Fatal notice for a store that cannot be opened at startup.
pub fn open_failure_notice(err: &RepoError) -> Notice {
    Notice::new(
        Severity::Critical,
        "Database Connection Error",
        format!("Could not connect to database: {err}\nThe application will now exit."),
    )
}

/// Confirmation prompt shown before deleting `key`.
pub fn delete_prompt(key: &RaceWinnerKey) -> String {
    format!(
        "Are you sure you want to delete entry for: {} ({}, {})?",
        key.rider, key.circuit, key.season
    )
}
