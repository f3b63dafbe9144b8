//! Calendar aggregate root.
//!
//! # Responsibility
//! - Own every `Event` and the `Day` slot tables they occupy.
//! - Route create/update/delete through the right `Day` and keep slot
//!   ownership in sync with event existence.
//! - Delegate reminder bookkeeping to the owning event.
//!
//! # Invariants
//! - For every stored event, each slot of `[start_at, end_at)` on its date
//!   is owned by that event and no other.
//! - No slot is owned by an event id that is not stored.
//! - A failing call leaves events and slots exactly as they were.

use crate::model::event::{Event, EventId};
use crate::model::reminder::{Reminder, ReminderKind};
use crate::service::clock::{Clock, SystemClock};
use crate::service::id_gen::{IdGenerator, UuidIdGenerator};
use crate::slots::{Day, SlotError, SlotRange};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from calendar use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// No stored event has this id.
    EventNotFound(EventId),
    /// Reminder index is outside `[0, len)` for the event.
    ReminderNotFound {
        event_id: EventId,
        index: usize,
        len: usize,
    },
    /// Requested interval overlaps slots held by `owner`.
    SlotNotAvailable {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        owner: EventId,
    },
    /// `start` is not strictly before `end`.
    InvalidInterval { start: NaiveTime, end: NaiveTime },
    /// Time is not on the 15-minute grid.
    UnalignedTime(NaiveTime),
    /// Date lies before today while the past-date guard is enabled.
    DateInPast { date: NaiveDate, today: NaiveDate },
    /// Id generator or snapshot produced an id that is already stored.
    DuplicateEventId(EventId),
}

impl CalendarError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "event_not_found",
            Self::ReminderNotFound { .. } => "reminder_not_found",
            Self::SlotNotAvailable { .. } => "slot_not_available",
            Self::InvalidInterval { .. } => "invalid_interval",
            Self::UnalignedTime(_) => "unaligned_time",
            Self::DateInPast { .. } => "date_in_past",
            Self::DuplicateEventId(_) => "duplicate_event_id",
        }
    }

    fn from_slot(err: SlotError, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        match err {
            SlotError::Unaligned(time) => Self::UnalignedTime(time),
            SlotError::InvalidInterval { start, end } => Self::InvalidInterval { start, end },
            SlotError::SlotNotAvailable { owner, .. } => Self::SlotNotAvailable {
                date,
                start,
                end,
                owner,
            },
            SlotError::EventNotFound(id) => Self::EventNotFound(id),
        }
    }
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::ReminderNotFound {
                event_id,
                index,
                len,
            } => write!(
                f,
                "reminder {index} not found on event {event_id} (has {len})"
            ),
            Self::SlotNotAvailable {
                date,
                start,
                end,
                owner,
            } => write!(
                f,
                "slot not available: {date} {}-{} overlaps event {owner}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            Self::InvalidInterval { start, end } => write!(
                f,
                "invalid interval: start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            Self::UnalignedTime(time) => write!(
                f,
                "time {} is not on the 15-minute grid",
                time.format("%H:%M:%S%.f")
            ),
            Self::DateInPast { date, today } => {
                write!(f, "date {date} is earlier than today ({today})")
            }
            Self::DuplicateEventId(id) => write!(f, "duplicate event id: {id}"),
        }
    }
}

impl Error for CalendarError {}

/// Behavior switches for a calendar instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Reject creating or moving events onto dates before `Clock::today()`.
    pub reject_past_dates: bool,
}

/// Request model for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_at: NaiveTime,
    pub end_at: NaiveTime,
}

/// Partial update for an existing event.
///
/// `None` keeps the current value. Window fields that are left out inherit
/// the event's current date/start/end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_at: Option<NaiveTime>,
    pub end_at: Option<NaiveTime>,
}

/// Aggregate root over events and their day slot tables.
#[derive(Debug)]
pub struct Calendar<G: IdGenerator = UuidIdGenerator, C: Clock = SystemClock> {
    config: CalendarConfig,
    ids: G,
    clock: C,
    events: Vec<Event>,
    days: BTreeMap<NaiveDate, Day>,
}

impl Calendar {
    /// Creates an empty calendar with UUID ids and the system clock.
    pub fn new() -> Self {
        Self::with_parts(CalendarConfig::default(), UuidIdGenerator, SystemClock)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator, C: Clock> Calendar<G, C> {
    /// Creates an empty calendar from explicit collaborators.
    pub fn with_parts(config: CalendarConfig, ids: G, clock: C) -> Self {
        Self {
            config,
            ids,
            clock,
            events: Vec::new(),
            days: BTreeMap::new(),
        }
    }

    /// Rebuilds a calendar from persisted events, deriving every `Day`.
    ///
    /// The past-date guard is not applied to restored events.
    ///
    /// # Errors
    /// - `DuplicateEventId` when two events share an id.
    /// - `SlotNotAvailable` when two events overlap on the same date.
    /// - `InvalidInterval` / `UnalignedTime` for malformed windows.
    pub fn restore(
        config: CalendarConfig,
        ids: G,
        clock: C,
        events: Vec<Event>,
    ) -> Result<Self, CalendarError> {
        let mut calendar = Self::with_parts(config, ids, clock);
        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(event.id.as_str()) {
                return Err(CalendarError::DuplicateEventId(event.id.clone()));
            }
            let range = event.window().map_err(|err| {
                CalendarError::from_slot(err, event.date, event.start_at, event.end_at)
            })?;
            calendar
                .days
                .entry(event.date)
                .or_insert_with(|| Day::new(event.date))
                .reserve_range(&event.id, range)
                .map_err(|err| {
                    CalendarError::from_slot(err, event.date, event.start_at, event.end_at)
                })?;
        }
        calendar.events = events;
        info!(
            "event=calendar_restore module=calendar status=ok events={} days={}",
            calendar.events.len(),
            calendar.days.len()
        );
        Ok(calendar)
    }

    pub fn config(&self) -> CalendarConfig {
        self.config
    }

    /// Stored events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events on `date`, ordered by start time.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| event.date == date)
            .collect();
        events.sort_by_key(|event| event.start_at);
        events
    }

    /// Slot table for `date`, if any event has been placed there.
    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.get(&date)
    }

    /// Dates that currently hold at least one event, ascending.
    pub fn days(&self) -> impl Iterator<Item = &Day> + '_ {
        self.days.values()
    }

    /// Maximal free runs on `date`; the whole day when nothing is booked.
    pub fn free_windows(&self, date: NaiveDate) -> Vec<SlotRange> {
        match self.days.get(&date) {
            Some(day) => day.free_windows(),
            None => vec![SlotRange::whole_day()],
        }
    }

    /// Creates an event and reserves its slots.
    ///
    /// The interval is validated before an id is generated. On any failure
    /// no event is stored and no slot changes.
    pub fn create_event(&mut self, request: &NewEvent) -> Result<EventId, CalendarError> {
        let result = self.try_create_event(request);
        match &result {
            Ok(id) => info!(
                "event=event_create module=calendar status=ok event_id={} date={}",
                id, request.date
            ),
            Err(err) => warn!(
                "event=event_create module=calendar status=error error_code={} date={}",
                err.code(),
                request.date
            ),
        }
        result
    }

    fn try_create_event(&mut self, request: &NewEvent) -> Result<EventId, CalendarError> {
        let (date, start_at, end_at) = (request.date, request.start_at, request.end_at);
        let range = SlotRange::new(start_at, end_at)
            .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))?;
        self.ensure_not_past(date)?;

        let id = self.ids.next_id();
        if self.position(&id).is_some() {
            return Err(CalendarError::DuplicateEventId(id));
        }
        if let Some(day) = self.days.get(&date) {
            day.check(&id, range)
                .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))?;
        }

        // Checked above; the write cannot conflict.
        self.commit_range(&id, date, range, start_at, end_at)?;
        self.events.push(Event::new(
            id.clone(),
            request.title.clone(),
            request.description.clone(),
            date,
            start_at,
            end_at,
        ));
        Ok(id)
    }

    /// Applies `changes` to event `id`.
    ///
    /// A new window on the same date moves the footprint with
    /// `Day::reassign`. A date change checks the target day first, then
    /// releases the old day and reserves the new one, so the event either
    /// lands completely or stays where it was.
    pub fn update_event(&mut self, id: &str, changes: EventChanges) -> Result<(), CalendarError> {
        let result = self.try_update_event(id, changes);
        match &result {
            Ok(()) => info!(
                "event=event_update module=calendar status=ok event_id={}",
                id
            ),
            Err(err) => warn!(
                "event=event_update module=calendar status=error error_code={} event_id={}",
                err.code(),
                id
            ),
        }
        result
    }

    fn try_update_event(&mut self, id: &str, changes: EventChanges) -> Result<(), CalendarError> {
        let index = self
            .position(id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        let current = &self.events[index];
        let old_date = current.date;
        let date = changes.date.unwrap_or(current.date);
        let start_at = changes.start_at.unwrap_or(current.start_at);
        let end_at = changes.end_at.unwrap_or(current.end_at);
        let moved = date != old_date || start_at != current.start_at || end_at != current.end_at;

        if moved {
            let range = SlotRange::new(start_at, end_at)
                .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))?;
            if date == old_date {
                self.days
                    .get_mut(&date)
                    .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?
                    .reassign_range(id, range)
                    .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))?;
            } else {
                self.ensure_not_past(date)?;
                if let Some(target) = self.days.get(&date) {
                    target
                        .check(id, range)
                        .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))?;
                }
                self.release_slots(id, old_date)?;
                self.commit_range(id, date, range, start_at, end_at)?;
            }
        }

        let event = &mut self.events[index];
        if let Some(title) = changes.title {
            event.title = title;
        }
        if let Some(description) = changes.description {
            event.description = description;
        }
        event.date = date;
        event.start_at = start_at;
        event.end_at = end_at;
        Ok(())
    }

    /// Deletes event `id`, frees its slots and returns it.
    pub fn delete_event(&mut self, id: &str) -> Result<Event, CalendarError> {
        let Some(index) = self.position(id) else {
            warn!(
                "event=event_delete module=calendar status=error error_code=event_not_found event_id={}",
                id
            );
            return Err(CalendarError::EventNotFound(id.to_string()));
        };
        let date = self.events[index].date;
        self.release_slots(id, date)?;
        let event = self.events.remove(index);
        info!(
            "event=event_delete module=calendar status=ok event_id={} date={}",
            id, date
        );
        Ok(event)
    }

    /// Appends a reminder to event `id` and returns its index.
    pub fn add_reminder(
        &mut self,
        id: &str,
        fire_at: NaiveDateTime,
        kind: ReminderKind,
    ) -> Result<usize, CalendarError> {
        let event = self.event_mut(id)?;
        let index = event.add_reminder(fire_at, kind);
        info!(
            "event=reminder_add module=calendar status=ok event_id={} index={} kind={}",
            id, index, kind
        );
        Ok(index)
    }

    /// Removes reminder `index` from event `id` and returns it.
    pub fn delete_reminder(&mut self, id: &str, index: usize) -> Result<Reminder, CalendarError> {
        let event = self.event_mut(id)?;
        let reminder = event
            .delete_reminder(index)
            .map_err(|err| CalendarError::ReminderNotFound {
                event_id: id.to_string(),
                index: err.index,
                len: err.len,
            })?;
        info!(
            "event=reminder_delete module=calendar status=ok event_id={} index={}",
            id, index
        );
        Ok(reminder)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }

    fn event_mut(&mut self, id: &str) -> Result<&mut Event, CalendarError> {
        self.events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))
    }

    fn ensure_not_past(&self, date: NaiveDate) -> Result<(), CalendarError> {
        if !self.config.reject_past_dates {
            return Ok(());
        }
        let today = self.clock.today();
        if date < today {
            return Err(CalendarError::DateInPast { date, today });
        }
        Ok(())
    }

    fn commit_range(
        &mut self,
        id: &str,
        date: NaiveDate,
        range: SlotRange,
        start_at: NaiveTime,
        end_at: NaiveTime,
    ) -> Result<(), CalendarError> {
        self.days
            .entry(date)
            .or_insert_with(|| Day::new(date))
            .reserve_range(id, range)
            .map_err(|err| CalendarError::from_slot(err, date, start_at, end_at))
    }

    /// Frees `id` on `date` and drops the day once it holds nothing.
    fn release_slots(&mut self, id: &str, date: NaiveDate) -> Result<(), CalendarError> {
        let day = self
            .days
            .get_mut(&date)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        day.release(id)
            .map_err(|_| CalendarError::EventNotFound(id.to_string()))?;
        if day.is_empty() {
            self.days.remove(&date);
        }
        Ok(())
    }
}
