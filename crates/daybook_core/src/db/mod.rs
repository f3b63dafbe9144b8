//! SQLite bootstrap for the event snapshot store.
//!
//! # Responsibility
//! - Open connections with the pragmas the snapshot store relies on.
//! - Bring the schema up to date and verify it before repositories use it.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Repositories only accept connections where every snapshot table exists.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Tables an event snapshot needs, in dependency order.
pub const SNAPSHOT_TABLES: &[&str] = &["events", "reminders"];

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Migration `version` failed; the whole upgrade was rolled back.
    Migration { version: u32, source: rusqlite::Error },
    /// Connection lacks a snapshot table, usually because it was opened
    /// without `open_db`.
    SchemaMissing { table: &'static str },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "calendar database schema {db_version} is newer than supported {latest_supported}"
            ),
            Self::Migration { version, source } => {
                write!(f, "calendar schema migration {version} failed: {source}")
            }
            Self::SchemaMissing { table } => write!(
                f,
                "calendar table `{table}` is missing; open the database with open_db"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SchemaMissing { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Checks that every snapshot table exists on `conn`.
///
/// # Errors
/// - `SchemaMissing` naming the first absent table.
pub fn ensure_snapshot_schema(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
    )?;
    for &table in SNAPSHOT_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Err(DbError::SchemaMissing { table });
        }
    }
    Ok(())
}
