//! Intent dispatch table for presentation shells.
//!
//! # Responsibility
//! - Map intent names coming from a shell to typed [`Intent`] values.
//! - Route each intent to the matching [`FormController`] handler.
//!
//! # Invariants
//! - Dispatch is synchronous; every intent completes before the next one.
//! - Unknown names and malformed arguments never reach the controller.

use crate::model::race_winner::RaceWinnerKey;
use crate::repo::race_winner_repo::RaceWinnerRepository;
use crate::service::form_controller::{FormController, FormError, FormField, Notice};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Argument shape expected by an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentArg {
    None,
    /// Any text, possibly empty.
    Text,
    /// Zero-based row index.
    RowIndex,
    /// Field name followed by its value.
    FieldValue,
}

/// Which [`Intent`] variant a table entry builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Add,
    Update,
    Delete,
    Clear,
    Search,
    Filter,
    Select,
    Set,
    Refresh,
}

impl IntentKind {
    pub fn arg(self) -> IntentArg {
        match self {
            Self::Add | Self::Update | Self::Delete | Self::Clear | Self::Refresh => {
                IntentArg::None
            }
            Self::Search | Self::Filter => IntentArg::Text,
            Self::Select => IntentArg::RowIndex,
            Self::Set => IntentArg::FieldValue,
        }
    }
}

/// Entry of the static intent table.
#[derive(Debug, Clone, Copy)]
pub struct IntentSpec {
    pub name: &'static str,
    pub kind: IntentKind,
    pub help: &'static str,
}

impl IntentSpec {
    pub fn arg(&self) -> IntentArg {
        self.kind.arg()
    }
}

/// Every intent a shell may forward, by name.
pub const INTENT_TABLE: &[IntentSpec] = &[
    IntentSpec {
        name: "add",
        kind: IntentKind::Add,
        help: "insert the form as a new entry",
    },
    IntentSpec {
        name: "update",
        kind: IntentKind::Update,
        help: "overwrite the loaded entry with the form",
    },
    IntentSpec {
        name: "delete",
        kind: IntentKind::Delete,
        help: "delete the loaded entry after confirmation",
    },
    IntentSpec {
        name: "clear",
        kind: IntentKind::Clear,
        help: "reset the form",
    },
    IntentSpec {
        name: "search",
        kind: IntentKind::Search,
        help: "filter rows by circuit substring (case-sensitive)",
    },
    IntentSpec {
        name: "filter",
        kind: IntentKind::Filter,
        help: "filter rows by class label, or All",
    },
    IntentSpec {
        name: "select",
        kind: IntentKind::Select,
        help: "load a displayed row into the form",
    },
    IntentSpec {
        name: "set",
        kind: IntentKind::Set,
        help: "set a form field: season|circuit|class|rider|constructor|country",
    },
    IntentSpec {
        name: "refresh",
        kind: IntentKind::Refresh,
        help: "reload rows and filter options",
    },
];

/// Typed user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add,
    Update,
    Delete,
    Clear,
    Search(String),
    Filter(String),
    Select(usize),
    Set(FormField, String),
    Refresh,
}

/// Intent name or argument could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentParseError {
    UnknownIntent(String),
    InvalidArgument { intent: &'static str, detail: String },
}

impl Display for IntentParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownIntent(name) => write!(f, "unknown command `{name}`"),
            Self::InvalidArgument { intent, detail } => {
                write!(f, "invalid argument for `{intent}`: {detail}")
            }
        }
    }
}

impl Error for IntentParseError {}

/// Looks up an intent by name.
pub fn find_intent(name: &str) -> Option<&'static IntentSpec> {
    INTENT_TABLE.iter().find(|spec| spec.name == name)
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Add => IntentKind::Add,
            Self::Update => IntentKind::Update,
            Self::Delete => IntentKind::Delete,
            Self::Clear => IntentKind::Clear,
            Self::Search(_) => IntentKind::Search,
            Self::Filter(_) => IntentKind::Filter,
            Self::Select(_) => IntentKind::Select,
            Self::Set(..) => IntentKind::Set,
            Self::Refresh => IntentKind::Refresh,
        }
    }

    /// Builds an intent from its table name and raw argument text.
    pub fn parse(name: &str, arg: &str) -> Result<Self, IntentParseError> {
        let spec = find_intent(name.trim())
            .ok_or_else(|| IntentParseError::UnknownIntent(name.trim().to_string()))?;

        let trimmed = arg.trim();
        if spec.arg() == IntentArg::None && !trimmed.is_empty() {
            return Err(IntentParseError::InvalidArgument {
                intent: spec.name,
                detail: "takes no argument".to_string(),
            });
        }

        Ok(match spec.kind {
            IntentKind::Add => Self::Add,
            IntentKind::Update => Self::Update,
            IntentKind::Delete => Self::Delete,
            IntentKind::Clear => Self::Clear,
            IntentKind::Refresh => Self::Refresh,
            IntentKind::Search => Self::Search(arg.to_string()),
            IntentKind::Filter => Self::Filter(trimmed.to_string()),
            IntentKind::Select => {
                let index = trimmed.parse::<usize>().map_err(|_| {
                    IntentParseError::InvalidArgument {
                        intent: spec.name,
                        detail: format!("expected a row index, got `{trimmed}`"),
                    }
                })?;
                Self::Select(index)
            }
            IntentKind::Set => {
                let (field_name, value) = arg
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .unwrap_or((trimmed, ""));
                let field = FormField::from_name(field_name).ok_or_else(|| {
                    IntentParseError::InvalidArgument {
                        intent: spec.name,
                        detail: format!("unknown field `{field_name}`"),
                    }
                })?;
                Self::Set(field, value.trim().to_string())
            }
        })
    }
}

impl<R: RaceWinnerRepository> FormController<R> {
    /// Routes one intent to its handler.
    ///
    /// Returns a notice for operations that raise a modal on success
    /// (add/update/delete); other intents only update the status line.
    pub fn dispatch(
        &mut self,
        intent: Intent,
        confirm: impl FnOnce(&RaceWinnerKey) -> bool,
    ) -> Result<Option<Notice>, FormError> {
        match intent {
            Intent::Add => self.add(self.fields().clone()).map(Some),
            Intent::Update => self.update(self.fields().clone()).map(Some),
            Intent::Delete => self.delete_with(confirm),
            Intent::Clear => {
                self.clear();
                Ok(None)
            }
            Intent::Search(text) => self.search_changed(text).map(|_| None),
            Intent::Filter(class) => self.filter_changed(class).map(|_| None),
            Intent::Select(index) => self.select_row(index).map(|_| None),
            Intent::Set(field, value) => self.set_field(field, &value).map(|_| None),
            Intent::Refresh => self.reload().map(|_| None),
        }
    }
}
