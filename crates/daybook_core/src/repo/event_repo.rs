//! Event snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Save the full ordered event list in one transaction.
//! - Load it back with reminders in their original order.
//!
//! # Invariants
//! - `save_events` replaces the previous snapshot atomically.
//! - Read paths reject malformed dates, times and reminder kinds instead of
//!   masking them.

use crate::db::{ensure_snapshot_schema, DbError};
use crate::model::event::Event;
use crate::model::reminder::{Reminder, ReminderKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
// `%.f` writes nothing for whole seconds and the exact fraction otherwise;
// parsing accepts both.
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
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

/// Snapshot store for calendar events.
pub trait EventRepository {
    /// Replaces the stored snapshot with `events`, preserving their order.
    fn save_events(&mut self, events: &[Event]) -> RepoResult<()>;
    /// Loads the stored snapshot in saved order.
    fn load_events(&self) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `Db(SchemaMissing)` when the connection was not migrated.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_snapshot_schema(conn)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn save_events(&mut self, events: &[Event]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM reminders;", [])?;
        tx.execute("DELETE FROM events;", [])?;

        for (position, event) in events.iter().enumerate() {
            tx.execute(
                "INSERT INTO events (id, position, title, description, date, start_at, end_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    event.id.as_str(),
                    position as i64,
                    event.title.as_str(),
                    event.description.as_str(),
                    event.date.format(DATE_FORMAT).to_string(),
                    event.start_at.format(TIME_FORMAT).to_string(),
                    event.end_at.format(TIME_FORMAT).to_string(),
                ],
            )?;
            for (reminder_position, reminder) in event.reminders.iter().enumerate() {
                tx.execute(
                    "INSERT INTO reminders (event_id, position, fire_at, kind)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        event.id.as_str(),
                        reminder_position as i64,
                        reminder.fire_at.format(DATE_TIME_FORMAT).to_string(),
                        reminder.kind.as_str(),
                    ],
                )?;
            }
        }

        tx.commit()?;
        info!(
            "event=events_save module=repo status=ok events={}",
            events.len()
        );
        Ok(())
    }

    fn load_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, date, start_at, end_at
             FROM events
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            let mut event = parse_event_row(row)?;
            event.reminders = load_reminders(self.conn, &event.id)?;
            events.push(event);
        }

        info!(
            "event=events_load module=repo status=ok events={}",
            events.len()
        );
        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in events.date"))
    })?;
    let start_at = parse_time(row.get("start_at")?, "events.start_at")?;
    let end_at = parse_time(row.get("end_at")?, "events.end_at")?;

    let event = Event::new(
        row.get("id")?,
        row.get::<_, String>("title")?,
        row.get::<_, String>("description")?,
        date,
        start_at,
        end_at,
    );
    Ok(event)
}

fn load_reminders(conn: &Connection, event_id: &str) -> RepoResult<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT fire_at, kind
         FROM reminders
         WHERE event_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([event_id])?;
    let mut reminders = Vec::new();
    while let Some(row) = rows.next()? {
        let fire_at_text: String = row.get("fire_at")?;
        let fire_at =
            NaiveDateTime::parse_from_str(&fire_at_text, DATE_TIME_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid date-time `{fire_at_text}` in reminders.fire_at"
                ))
            })?;
        let kind_text: String = row.get("kind")?;
        let kind = kind_text.parse::<ReminderKind>().map_err(|_| {
            RepoError::InvalidData(format!("invalid reminder kind `{kind_text}` in reminders.kind"))
        })?;
        reminders.push(Reminder::new(fire_at, kind));
    }
    Ok(reminders)
}

fn parse_time(value: String, column: &str) -> RepoResult<NaiveTime> {
    NaiveTime::parse_from_str(&value, TIME_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid time `{value}` in {column}")))
}
