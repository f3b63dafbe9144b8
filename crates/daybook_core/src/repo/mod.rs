//! Repository layer for calendar persistence.
//!
//! # Responsibility
//! - Persist events (with their reminders) as an ordered snapshot.
//! - Keep SQLite details out of the calendar aggregate.
//!
//! # Invariants
//! - Only events are stored; day slot tables are rebuilt with
//!   `Calendar::restore` after loading.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   DB transport errors.

pub mod event_repo;
