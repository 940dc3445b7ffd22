//! Race-winner gateway contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the single connection to the winners store for the process lifetime.
//! - Provide list/insert/update/delete/distinct-value APIs over
//!   `grand_prix_race_winners`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every statement is parameterized; callers never see query text.
//! - Each call commits on its own; no transaction spans two calls.
//! - A composite-key collision is reported as `DuplicateKey`, never as a raw
//!   SQLite error. Other constraint failures (CHECK, NOT NULL, triggers) stay
//!   store errors.
//! - Read paths reject rows with an unknown class instead of masking them.

use crate::db::schema::WINNERS_TABLE;
use crate::db::{open_db, open_db_in_memory, schema::ensure_schema, DbError};
use crate::model::race_winner::{
    RaceClass, RaceWinner, RaceWinnerKey, RaceWinnerValidationError,
};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

/// Class filter value that disables class filtering.
pub const CLASS_FILTER_ALL: &str = "All";

const WINNER_SELECT_SQL: &str = "SELECT
    Season,
    Circuit,
    Class,
    Rider,
    Constructor,
    Country
FROM grand_prix_race_winners";

pub type RepoResult<T> = Result<T, RepoError>;

/// Gateway error for race-winner persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation before reaching the store.
    Validation(RaceWinnerValidationError),
    /// Another row already holds this composite key.
    DuplicateKey(RaceWinnerKey),
    /// No row matches the original key of an update.
    NotFound(RaceWinnerKey),
    /// Connection was already released by `close()`.
    Closed,
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey(key) => write!(f, "race winner already exists: {key}"),
            Self::NotFound(key) => write!(f, "race winner not found: {key}"),
            Self::Closed => write!(f, "database connection is closed"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted race winner data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey(_) | Self::NotFound(_) | Self::Closed | Self::InvalidData(_) => {
                None
            }
        }
    }
}

impl From<RaceWinnerValidationError> for RepoError {
    fn from(value: RaceWinnerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter options for listing race winners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerListQuery {
    /// Case-sensitive substring matched against `Circuit`; empty matches all.
    pub circuit_contains: String,
    /// Exact `Class` label, or [`CLASS_FILTER_ALL`].
    pub class_filter: String,
}

impl WinnerListQuery {
    pub fn new(circuit_contains: impl Into<String>, class_filter: impl Into<String>) -> Self {
        Self {
            circuit_contains: circuit_contains.into(),
            class_filter: class_filter.into(),
        }
    }
}

impl Default for WinnerListQuery {
    fn default() -> Self {
        Self::new("", CLASS_FILTER_ALL)
    }
}

/// Repository interface for the race-winner gateway.
pub trait RaceWinnerRepository {
    /// Lists winners ordered by season descending, then circuit ascending.
    fn list_winners(&self, query: &WinnerListQuery) -> RepoResult<Vec<RaceWinner>>;
    /// Inserts one winner; fails with `DuplicateKey` on key collision.
    fn insert_winner(&self, winner: &RaceWinner) -> RepoResult<()>;
    /// Overwrites all six fields of the row identified by `original`.
    fn update_winner(&self, original: &RaceWinnerKey, winner: &RaceWinner) -> RepoResult<()>;
    /// Deletes the row identified by `key`; returns the number of rows removed.
    fn delete_winner(&self, key: &RaceWinnerKey) -> RepoResult<usize>;
    /// Non-empty distinct class labels, ascending.
    fn distinct_classes(&self) -> RepoResult<Vec<String>>;
    /// Non-empty distinct countries, ascending.
    fn distinct_countries(&self) -> RepoResult<Vec<String>>;
    /// Releases the underlying connection. Safe to call repeatedly.
    fn close(&mut self) -> RepoResult<()>;
}

/// SQLite-backed race-winner gateway owning its connection.
pub struct SqliteRaceWinnerRepository {
    conn: Option<Connection>,
}

impl SqliteRaceWinnerRepository {
    /// Wraps an opened connection after verifying the winners table.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    /// Opens (or creates) the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Returns whether the connection is still held.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn.as_ref().ok_or(RepoError::Closed)
    }
}

impl RaceWinnerRepository for SqliteRaceWinnerRepository {
    fn list_winners(&self, query: &WinnerListQuery) -> RepoResult<Vec<RaceWinner>> {
        observe("winner_list", || {
            let conn = self.conn()?;
            let mut sql = format!("{WINNER_SELECT_SQL} WHERE 1 = 1");
            let mut bind_values: Vec<Value> = Vec::new();

            if !query.circuit_contains.is_empty() {
                // instr() keeps the match case-sensitive, unlike LIKE.
                sql.push_str(" AND instr(Circuit, ?) > 0");
                bind_values.push(Value::Text(query.circuit_contains.clone()));
            }

            if query.class_filter != CLASS_FILTER_ALL {
                sql.push_str(" AND Class = ?");
                bind_values.push(Value::Text(query.class_filter.clone()));
            }

            sql.push_str(" ORDER BY Season DESC, Circuit ASC");

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut winners = Vec::new();
            while let Some(row) = rows.next()? {
                winners.push(parse_winner_row(row)?);
            }
            Ok(winners)
        })
    }

    fn insert_winner(&self, winner: &RaceWinner) -> RepoResult<()> {
        observe("winner_insert", || {
            winner.validate()?;
            let conn = self.conn()?;
            let result = conn.execute(
                "INSERT INTO grand_prix_race_winners (
                    Season,
                    Circuit,
                    Class,
                    Rider,
                    Constructor,
                    Country
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    winner.season,
                    winner.circuit.as_str(),
                    winner.class.label(),
                    winner.rider.as_str(),
                    winner.constructor.as_str(),
                    winner.country.as_str(),
                ],
            );
            map_write_result(result, winner).map(|_| ())
        })
    }

    fn update_winner(&self, original: &RaceWinnerKey, winner: &RaceWinner) -> RepoResult<()> {
        observe("winner_update", || {
            winner.validate()?;
            let conn = self.conn()?;
            let result = conn.execute(
                "UPDATE grand_prix_race_winners
                 SET
                    Season = ?1,
                    Circuit = ?2,
                    Class = ?3,
                    Rider = ?4,
                    Constructor = ?5,
                    Country = ?6
                 WHERE Season = ?7 AND Circuit = ?8 AND Class = ?9 AND Rider = ?10;",
                params![
                    winner.season,
                    winner.circuit.as_str(),
                    winner.class.label(),
                    winner.rider.as_str(),
                    winner.constructor.as_str(),
                    winner.country.as_str(),
                    original.season,
                    original.circuit.as_str(),
                    original.class.label(),
                    original.rider.as_str(),
                ],
            );

            if map_write_result(result, winner)? == 0 {
                return Err(RepoError::NotFound(original.clone()));
            }
            Ok(())
        })
    }

    fn delete_winner(&self, key: &RaceWinnerKey) -> RepoResult<usize> {
        observe("winner_delete", || {
            let conn = self.conn()?;
            let changed = conn.execute(
                "DELETE FROM grand_prix_race_winners
                 WHERE Season = ?1 AND Circuit = ?2 AND Class = ?3 AND Rider = ?4;",
                params![
                    key.season,
                    key.circuit.as_str(),
                    key.class.label(),
                    key.rider.as_str(),
                ],
            )?;
            Ok(changed)
        })
    }

    fn distinct_classes(&self) -> RepoResult<Vec<String>> {
        observe("winner_distinct_classes", || {
            distinct_column_values(self.conn()?, "Class")
        })
    }

    fn distinct_countries(&self) -> RepoResult<Vec<String>> {
        observe("winner_distinct_countries", || {
            distinct_column_values(self.conn()?, "Country")
        })
    }

    fn close(&mut self) -> RepoResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                info!("event=db_close module=repo status=ok");
                Ok(())
            }
            Err((conn, err)) => {
                // Keep the handle so a later close can retry.
                self.conn = Some(conn);
                error!("event=db_close module=repo status=error error={err}");
                Err(err.into())
            }
        }
    }
}

/// Row counts returned by the store for logging.
trait RowCount {
    fn row_count(&self) -> Option<usize>;
}

impl RowCount for () {
    fn row_count(&self) -> Option<usize> {
        None
    }
}

impl RowCount for usize {
    fn row_count(&self) -> Option<usize> {
        Some(*self)
    }
}

impl<T> RowCount for Vec<T> {
    fn row_count(&self) -> Option<usize> {
        Some(self.len())
    }
}

fn observe<T: RowCount>(event: &'static str, op: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = op();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(value) => match value.row_count() {
            Some(rows) => info!(
                "event={event} module=repo status=ok duration_ms={duration_ms} rows={rows}"
            ),
            None => info!("event={event} module=repo status=ok duration_ms={duration_ms}"),
        },
        Err(err) => error!(
            "event={event} module=repo status=error duration_ms={duration_ms} error_code={}",
            error_code(err)
        ),
    }
    result
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::DuplicateKey(_) => "duplicate_key",
        RepoError::NotFound(_) => "not_found",
        RepoError::Closed => "closed",
        RepoError::Db(_) => "db",
        RepoError::InvalidData(_) => "invalid_data",
    }
}

fn map_write_result(result: rusqlite::Result<usize>, winner: &RaceWinner) -> RepoResult<usize> {
    match result {
        Ok(changed) => Ok(changed),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
        {
            Err(RepoError::DuplicateKey(winner.key()))
        }
        Err(err) => Err(err.into()),
    }
}

fn distinct_column_values(conn: &Connection, column: &'static str) -> RepoResult<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT {column}
         FROM {WINNERS_TABLE}
         WHERE {column} IS NOT NULL AND {column} != ''
         ORDER BY {column} ASC;"
    );
    let mut stmt = conn.prepare(&sql)?;
    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

fn parse_winner_row(row: &Row<'_>) -> RepoResult<RaceWinner> {
    let class_text: String = row.get("Class")?;
    let class = RaceClass::from_label(&class_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid class `{class_text}` in {WINNERS_TABLE}.Class"
        ))
    })?;

    Ok(RaceWinner {
        season: row.get("Season")?,
        circuit: row.get("Circuit")?,
        class,
        rider: row.get("Rider")?,
        constructor: row
            .get::<_, Option<String>>("Constructor")?
            .unwrap_or_default(),
        country: row.get::<_, Option<String>>("Country")?.unwrap_or_default(),
    })
}
