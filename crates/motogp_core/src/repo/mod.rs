//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for race-winner records.
//! - Isolate SQLite query details from form orchestration.
//!
//! # Invariants
//! - Repository writes enforce `RaceWinner::validate()` before persistence.
//! - Repository APIs return semantic errors (`DuplicateKey`, `NotFound`) in
//!   addition to DB transport errors.

pub mod race_winner_repo;
