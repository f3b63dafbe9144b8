//! Core domain logic for Daybook, a personal calendar.
//! This crate is the single source of truth for scheduling invariants:
//! events on the same day never overlap on the 15-minute slot grid.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slots;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::event::{Event, EventId, ReminderNotFound};
pub use model::reminder::{ParseReminderKindError, Reminder, ReminderKind};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use service::calendar::{Calendar, CalendarConfig, CalendarError, EventChanges, NewEvent};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::id_gen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use slots::{Day, SlotError, SlotRange, SLOTS_PER_DAY, SLOT_MINUTES};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
