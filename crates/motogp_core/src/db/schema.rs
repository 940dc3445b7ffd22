//! Winners table creation and verification.
//!
//! # Responsibility
//! - Create `grand_prix_race_winners` when the store is fresh.
//! - Reject pre-existing tables whose columns or uniqueness constraint differ.
//!
//! # Invariants
//! - Column names are compared with exact case.
//! - At least one full (non-partial) UNIQUE index covers exactly the
//!   composite key columns.
//! - There is no schema versioning; the table shape is fixed.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Name of the single persisted table.
pub const WINNERS_TABLE: &str = "grand_prix_race_winners";

/// Columns of the winners table, in declaration order.
pub const WINNERS_COLUMNS: [&str; 6] =
    ["Season", "Circuit", "Class", "Rider", "Constructor", "Country"];

/// Columns forming the composite key.
pub const KEY_COLUMNS: [&str; 4] = ["Season", "Circuit", "Class", "Rider"];

const CREATE_SQL: &str = include_str!("schema.sql");

/// Creates the winners table if missing, then verifies its layout.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_SQL)?;
    verify_columns(conn)?;
    verify_key_constraint(conn)?;
    Ok(())
}

fn verify_columns(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let actual = stmt
        .query_map([WINNERS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    let expected = WINNERS_COLUMNS
        .iter()
        .map(|name| (*name).to_string())
        .collect::<BTreeSet<_>>();

    if actual != expected {
        let actual_list = actual.into_iter().collect::<Vec<_>>().join(", ");
        return Err(DbError::SchemaMismatch(format!(
            "{WINNERS_TABLE} columns are [{actual_list}], expected [{}]",
            WINNERS_COLUMNS.join(", ")
        )));
    }
    Ok(())
}

fn verify_key_constraint(conn: &Connection) -> DbResult<()> {
    let expected = KEY_COLUMNS
        .iter()
        .map(|name| (*name).to_string())
        .collect::<BTreeSet<_>>();

    let mut index_stmt = conn.prepare(
        "SELECT name FROM pragma_index_list(?1) WHERE \"unique\" = 1 AND partial = 0;",
    )?;
    let unique_indexes = index_stmt
        .query_map([WINNERS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut column_stmt = conn.prepare("SELECT name FROM pragma_index_info(?1);")?;
    for index_name in unique_indexes {
        let covered = column_stmt
            .query_map([index_name.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        if covered == expected {
            return Ok(());
        }
    }

    Err(DbError::SchemaMismatch(format!(
        "{WINNERS_TABLE} has no UNIQUE constraint on ({})",
        KEY_COLUMNS.join(", ")
    )))
}
