//! Domain model for race-winner records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the natural composite key explicit instead of a surrogate id.
//!
//! # Invariants
//! - A record is identified only by `(season, circuit, class, rider)`.
//! - Records are removed by hard delete; there are no tombstones.

pub mod race_winner;
