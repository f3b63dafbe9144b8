//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical event record stored by `Calendar`.
//! - Own the ordered reminder list of an event.
//!
//! # Invariants
//! - `id` is assigned once by the calendar's id generator and never changes.
//! - `[start_at, end_at)` is a valid slot range; slot ownership itself is
//!   enforced by `Day`, not by the event.
//! - Reminder order is insertion order.

use crate::model::reminder::{Reminder, ReminderKind};
use crate::slots::{SlotError, SlotRange};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for an event, produced by an `IdGenerator`.
pub type EventId = String;

/// Reminder index was outside `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderNotFound {
    pub index: usize,
    pub len: usize,
}

impl Display for ReminderNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reminder index {} out of range (event has {})",
            self.index, self.len
        )
    }
}

impl Error for ReminderNotFound {}

/// A titled activity on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Inclusive start, aligned to the slot grid.
    pub start_at: NaiveTime,
    /// Exclusive end, aligned to the slot grid. `00:00` means end of day.
    pub end_at: NaiveTime,
    pub reminders: Vec<Reminder>,
}

impl Event {
    /// Builds an event with no reminders.
    ///
    /// Does not validate the time window; `Calendar` does that before any
    /// event reaches its collection.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        start_at: NaiveTime,
        end_at: NaiveTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            date,
            start_at,
            end_at,
            reminders: Vec::new(),
        }
    }

    /// Returns the slot range covered by `[start_at, end_at)`.
    pub fn window(&self) -> Result<SlotRange, SlotError> {
        SlotRange::new(self.start_at, self.end_at)
    }

    /// Appends a reminder and returns its position.
    pub fn add_reminder(&mut self, fire_at: NaiveDateTime, kind: ReminderKind) -> usize {
        self.reminders.push(Reminder::new(fire_at, kind));
        self.reminders.len() - 1
    }

    /// Removes the reminder at `index`.
    ///
    /// Later reminders shift down by one, so callers must not cache indices
    /// across deletions.
    pub fn delete_reminder(&mut self, index: usize) -> Result<Reminder, ReminderNotFound> {
        if index >= self.reminders.len() {
            return Err(ReminderNotFound {
                index,
                len: self.reminders.len(),
            });
        }
        Ok(self.reminders.remove(index))
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Event title: {}", self.title)?;
        writeln!(f, "Description: {}", self.description)?;
        write!(
            f,
            "Time: {} {} - {}",
            self.date,
            self.start_at.format("%H:%M"),
            self.end_at.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, ReminderNotFound};
    use crate::model::reminder::ReminderKind;
    use chrono::{NaiveDate, NaiveTime};

    fn sample() -> Event {
        Event::new(
            "evt-1".to_string(),
            "Standup",
            "daily sync",
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
        )
    }

    #[test]
    fn delete_reminder_out_of_range_keeps_list() {
        let mut event = sample();
        let fire_at = event.date.and_hms_opt(8, 45, 0).unwrap();
        event.add_reminder(fire_at, ReminderKind::System);

        let err = event.delete_reminder(1).unwrap_err();
        assert_eq!(err, ReminderNotFound { index: 1, len: 1 });
        assert_eq!(event.reminders.len(), 1);
    }

    #[test]
    fn display_includes_time_window() {
        let rendered = sample().to_string();
        assert!(rendered.contains("Event title: Standup"));
        assert!(rendered.contains("09:00 - 09:15"));
    }
}
