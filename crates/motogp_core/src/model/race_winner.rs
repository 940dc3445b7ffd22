//! Race-winner domain model.
//!
//! # Responsibility
//! - Define the canonical race-winner record and its composite key.
//! - Own the enumerated race classes and their stored labels.
//! - Validate record invariants before persistence.
//!
//! # Invariants
//! - `season` lies within [`SEASON_MIN`, `SEASON_MAX`].
//! - `circuit` and `rider` are non-empty after trimming.
//! - `class` is always one of the enumerated [`RaceClass`] values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// First championship season accepted by the form.
pub const SEASON_MIN: i64 = 1949;
/// Last championship season accepted by the form.
pub const SEASON_MAX: i64 = 2022;

/// Championship class a race was run in.
///
/// Declaration order is the display order; the first variant is the form
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceClass {
    #[serde(rename = "MotoGP")]
    MotoGp,
    #[serde(rename = "Moto2")]
    Moto2,
    #[serde(rename = "Moto3")]
    Moto3,
    #[serde(rename = "500cc")]
    Cc500,
    #[serde(rename = "250cc")]
    Cc250,
    #[serde(rename = "125cc")]
    Cc125,
    #[serde(rename = "350cc")]
    Cc350,
    #[serde(rename = "80cc")]
    Cc80,
    #[serde(rename = "50cc")]
    Cc50,
}

impl RaceClass {
    /// All classes in display order.
    pub const ALL: [RaceClass; 9] = [
        RaceClass::MotoGp,
        RaceClass::Moto2,
        RaceClass::Moto3,
        RaceClass::Cc500,
        RaceClass::Cc250,
        RaceClass::Cc125,
        RaceClass::Cc350,
        RaceClass::Cc80,
        RaceClass::Cc50,
    ];

    /// Exact label stored in the `Class` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::MotoGp => "MotoGP",
            Self::Moto2 => "Moto2",
            Self::Moto3 => "Moto3",
            Self::Cc500 => "500cc",
            Self::Cc250 => "250cc",
            Self::Cc125 => "125cc",
            Self::Cc350 => "350cc",
            Self::Cc80 => "80cc",
            Self::Cc50 => "50cc",
        }
    }

    /// Parses a stored label. Matching is exact and case-sensitive.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == value)
    }
}

impl Default for RaceClass {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl Display for RaceClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RaceClass {
    type Err = RaceWinnerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| RaceWinnerValidationError::UnknownClass(s.to_string()))
    }
}

/// Validation failures for race-winner records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceWinnerValidationError {
    /// Season, circuit or rider is blank.
    MissingRequiredField,
    /// Season text is not an integer.
    SeasonNotNumeric(String),
    /// Season is outside the championship range.
    SeasonOutOfRange(i64),
    /// Class label is not one of the enumerated classes.
    UnknownClass(String),
}

impl Display for RaceWinnerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField => {
                write!(f, "Season, Circuit, and Rider cannot be empty.")
            }
            Self::SeasonNotNumeric(_) => write!(f, "Season must be a valid number."),
            Self::SeasonOutOfRange(_) => write!(
                f,
                "Season must be between {SEASON_MIN} and {SEASON_MAX}."
            ),
            Self::UnknownClass(value) => write!(f, "unknown race class `{value}`"),
        }
    }
}

impl Error for RaceWinnerValidationError {}

/// Natural composite key of a race-winner record.
///
/// Passed by value between the form controller and the gateway; never derived
/// from a row position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceWinnerKey {
    pub season: i64,
    pub circuit: String,
    pub class: RaceClass,
    pub rider: String,
}

impl Display for RaceWinnerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.season, self.circuit, self.class, self.rider
        )
    }
}

/// One race-winner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceWinner {
    pub season: i64,
    pub circuit: String,
    pub class: RaceClass,
    pub rider: String,
    /// Free text; may be empty.
    pub constructor: String,
    /// Free text; may be empty.
    pub country: String,
}

impl RaceWinner {
    /// Builds a record from raw field values without validating it.
    pub fn new(
        season: i64,
        circuit: impl Into<String>,
        class: RaceClass,
        rider: impl Into<String>,
        constructor: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            season,
            circuit: circuit.into(),
            class,
            rider: rider.into(),
            constructor: constructor.into(),
            country: country.into(),
        }
    }

    /// Returns the composite key identifying this record.
    pub fn key(&self) -> RaceWinnerKey {
        RaceWinnerKey {
            season: self.season,
            circuit: self.circuit.clone(),
            class: self.class,
            rider: self.rider.clone(),
        }
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - `MissingRequiredField` when circuit or rider is blank.
    /// - `SeasonOutOfRange` when season is outside the championship range.
    pub fn validate(&self) -> Result<(), RaceWinnerValidationError> {
        if self.circuit.trim().is_empty() || self.rider.trim().is_empty() {
            return Err(RaceWinnerValidationError::MissingRequiredField);
        }
        validate_season(self.season)
    }
}

/// Parses user-entered season text.
///
/// Leading/trailing whitespace is ignored. An empty value is reported as a
/// missing field rather than a parse failure.
pub fn parse_season(text: &str) -> Result<i64, RaceWinnerValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RaceWinnerValidationError::MissingRequiredField);
    }
    let season = trimmed
        .parse::<i64>()
        .map_err(|_| RaceWinnerValidationError::SeasonNotNumeric(trimmed.to_string()))?;
    validate_season(season)?;
    Ok(season)
}

fn validate_season(season: i64) -> Result<(), RaceWinnerValidationError> {
    if (SEASON_MIN..=SEASON_MAX).contains(&season) {
        Ok(())
    } else {
        Err(RaceWinnerValidationError::SeasonOutOfRange(season))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_season, RaceClass, RaceWinnerValidationError};

    #[test]
    fn class_labels_round_trip_in_display_order() {
        let labels: Vec<&str> = RaceClass::ALL.iter().map(|class| class.label()).collect();
        assert_eq!(
            labels,
            vec!["MotoGP", "Moto2", "Moto3", "500cc", "250cc", "125cc", "350cc", "80cc", "50cc"]
        );
        for class in RaceClass::ALL {
            assert_eq!(RaceClass::from_label(class.label()), Some(class));
        }
    }

    #[test]
    fn class_parsing_is_case_sensitive() {
        assert_eq!(RaceClass::from_label("motogp"), None);
        assert_eq!(
            "moto2".parse::<RaceClass>().unwrap_err(),
            RaceWinnerValidationError::UnknownClass("moto2".to_string())
        );
    }

    #[test]
    fn default_class_is_first_option() {
        assert_eq!(RaceClass::default(), RaceClass::MotoGp);
    }

    #[test]
    fn parse_season_accepts_bounds_and_trims() {
        assert_eq!(parse_season(" 1949 "), Ok(1949));
        assert_eq!(parse_season("2022"), Ok(2022));
    }

    #[test]
    fn parse_season_rejects_blank_garbage_and_out_of_range() {
        assert_eq!(
            parse_season("  "),
            Err(RaceWinnerValidationError::MissingRequiredField)
        );
        assert_eq!(
            parse_season("20x1"),
            Err(RaceWinnerValidationError::SeasonNotNumeric("20x1".to_string()))
        );
        assert_eq!(
            parse_season("1948"),
            Err(RaceWinnerValidationError::SeasonOutOfRange(1948))
        );
        assert_eq!(
            parse_season("2023"),
            Err(RaceWinnerValidationError::SeasonOutOfRange(2023))
        );
    }
}
