//! Slot table for one calendar date.
//!
//! # Responsibility
//! - Track which event owns each 15-minute slot of a date.
//! - Reserve, release and move event footprints without overlap.
//!
//! # Invariants
//! - A slot is free or owned by exactly one event id.
//! - Every mutating call validates before it writes, so a failed call
//!   leaves the table unchanged.

use super::{slot_index, slot_time, SlotError, SlotRange, SLOTS_PER_DAY};
use crate::model::event::EventId;
use chrono::{NaiveDate, NaiveTime};
use log::debug;

/// Slot ownership table for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    date: NaiveDate,
    slots: Vec<Option<EventId>>,
}

impl Day {
    /// Creates a table with every slot free.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            slots: vec![None; SLOTS_PER_DAY],
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Owner of the slot starting at `time`.
    pub fn owner_at(&self, time: NaiveTime) -> Result<Option<&str>, SlotError> {
        let index = slot_index(time)?;
        Ok(self.slots[index].as_deref())
    }

    /// Iterates `(slot start, owner)` for all 96 slots in order.
    pub fn slots(&self) -> impl Iterator<Item = (NaiveTime, Option<&str>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, owner)| (slot_time(index), owner.as_deref()))
    }

    /// Returns true when no slot is owned.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Range spanned by `event_id`, or `None` when it owns nothing here.
    pub fn footprint(&self, event_id: &str) -> Option<SlotRange> {
        let mut owned = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.as_deref() == Some(event_id))
            .map(|(index, _)| index);
        let first = owned.next()?;
        let last = owned.last().unwrap_or(first);
        Some(SlotRange::from_indices(first, last + 1))
    }

    /// Maximal runs of free slots, in time order.
    pub fn free_windows(&self) -> Vec<SlotRange> {
        let mut windows = Vec::new();
        let mut run_start = None;
        for (index, owner) in self.slots.iter().enumerate() {
            match (owner, run_start) {
                (None, None) => run_start = Some(index),
                (Some(_), Some(first)) => {
                    windows.push(SlotRange::from_indices(first, index));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = run_start {
            windows.push(SlotRange::from_indices(first, SLOTS_PER_DAY));
        }
        windows
    }

    /// Checks that every slot in `range` is free or already held by
    /// `event_id`.
    pub fn check(&self, event_id: &str, range: SlotRange) -> Result<(), SlotError> {
        for index in range.indices() {
            if let Some(owner) = &self.slots[index] {
                if owner != event_id {
                    return Err(SlotError::SlotNotAvailable {
                        slot: slot_time(index),
                        owner: owner.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Reserves `[start, end)` for `event_id`.
    ///
    /// All-or-nothing: the whole interval is checked before any slot is
    /// written. Slots already held by `event_id` are not a conflict.
    pub fn reserve(
        &mut self,
        event_id: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), SlotError> {
        let range = SlotRange::new(start, end)?;
        self.reserve_range(event_id, range)
    }

    pub(crate) fn reserve_range(&mut self, event_id: &str, range: SlotRange) -> Result<(), SlotError> {
        self.check(event_id, range)?;
        self.write(event_id, range);
        debug!(
            "event=slot_reserve module=slots status=ok date={} event_id={} slots={}",
            self.date,
            event_id,
            range.len()
        );
        Ok(())
    }

    /// Frees every slot owned by `event_id` and returns how many were freed.
    ///
    /// # Errors
    /// - `EventNotFound` when `event_id` owns nothing on this date.
    pub fn release(&mut self, event_id: &str) -> Result<usize, SlotError> {
        let released = self.clear(event_id);
        if released == 0 {
            return Err(SlotError::EventNotFound(event_id.to_string()));
        }
        debug!(
            "event=slot_release module=slots status=ok date={} event_id={} slots={}",
            self.date, event_id, released
        );
        Ok(released)
    }

    /// Moves `event_id` to `[start, end)`, shrinking, growing or shifting
    /// its footprint.
    ///
    /// Runs in two passes: validate the new range with the event's own slots
    /// counted as free, then clear the old footprint and write the new one.
    /// An event that owned nothing simply gets reserved.
    pub fn reassign(
        &mut self,
        event_id: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), SlotError> {
        let range = SlotRange::new(start, end)?;
        self.reassign_range(event_id, range)
    }

    pub(crate) fn reassign_range(
        &mut self,
        event_id: &str,
        range: SlotRange,
    ) -> Result<(), SlotError> {
        self.check(event_id, range)?;
        self.clear(event_id);
        self.write(event_id, range);
        debug!(
            "event=slot_reassign module=slots status=ok date={} event_id={} slots={}",
            self.date,
            event_id,
            range.len()
        );
        Ok(())
    }

    fn write(&mut self, event_id: &str, range: SlotRange) {
        for slot in &mut self.slots[range.indices()] {
            *slot = Some(event_id.to_string());
        }
    }

    fn clear(&mut self, event_id: &str) -> usize {
        let mut cleared = 0;
        for slot in &mut self.slots {
            if slot.as_deref() == Some(event_id) {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::Day;
    use crate::slots::{SlotError, SLOTS_PER_DAY};
    use chrono::{NaiveDate, NaiveTime};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn day() -> Day {
        Day::new(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
    }

    fn owned_by(day: &Day, id: &str) -> Vec<NaiveTime> {
        day.slots()
            .filter(|(_, owner)| *owner == Some(id))
            .map(|(time, _)| time)
            .collect()
    }

    #[test]
    fn new_day_has_all_slots_free() {
        let day = day();
        assert_eq!(day.slots().count(), SLOTS_PER_DAY);
        assert!(day.is_empty());
        assert_eq!(day.free_windows().len(), 1);
    }

    #[test]
    fn reserve_marks_half_open_interval() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(9, 45)).unwrap();

        assert_eq!(owned_by(&day, "a"), vec![t(9, 0), t(9, 15), t(9, 30)]);
        assert_eq!(day.owner_at(t(9, 45)).unwrap(), None);
    }

    #[test]
    fn reserve_is_idempotent_for_same_owner() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(9, 30)).unwrap();
        day.reserve("a", t(9, 0), t(9, 30)).unwrap();
        assert_eq!(owned_by(&day, "a").len(), 2);
    }

    #[test]
    fn reserve_conflict_writes_nothing() {
        let mut day = day();
        day.reserve("a", t(10, 0), t(10, 15)).unwrap();

        let err = day.reserve("b", t(9, 30), t(10, 30)).unwrap_err();
        assert_eq!(
            err,
            SlotError::SlotNotAvailable {
                slot: t(10, 0),
                owner: "a".to_string()
            }
        );
        assert!(owned_by(&day, "b").is_empty());
        assert_eq!(owned_by(&day, "a"), vec![t(10, 0)]);
    }

    #[test]
    fn release_without_ownership_fails() {
        let mut day = day();
        assert_eq!(
            day.release("ghost"),
            Err(SlotError::EventNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn release_clears_only_own_slots() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(9, 30)).unwrap();
        day.reserve("b", t(9, 30), t(10, 0)).unwrap();

        assert_eq!(day.release("a"), Ok(2));
        assert!(owned_by(&day, "a").is_empty());
        assert_eq!(owned_by(&day, "b").len(), 2);
    }

    #[test]
    fn reassign_can_grow_into_own_slots() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(9, 30)).unwrap();
        day.reassign("a", t(9, 15), t(10, 0)).unwrap();

        assert_eq!(owned_by(&day, "a"), vec![t(9, 15), t(9, 30), t(9, 45)]);
    }

    #[test]
    fn reassign_conflict_keeps_old_footprint() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(9, 30)).unwrap();
        day.reserve("b", t(10, 0), t(11, 0)).unwrap();
        let before = day.clone();

        let err = day.reassign("a", t(9, 30), t(10, 15)).unwrap_err();
        assert!(matches!(err, SlotError::SlotNotAvailable { owner, .. } if owner == "b"));
        assert_eq!(day, before);
    }

    #[test]
    fn footprint_and_free_windows_follow_reservations() {
        let mut day = day();
        day.reserve("a", t(9, 0), t(10, 0)).unwrap();
        day.reserve("b", t(23, 30), t(0, 0)).unwrap();

        let footprint = day.footprint("a").unwrap();
        assert_eq!(footprint.start_time(), t(9, 0));
        assert_eq!(footprint.end_time(), t(10, 0));
        assert!(day.footprint("missing").is_none());

        let free: Vec<_> = day
            .free_windows()
            .iter()
            .map(|window| (window.start_time(), window.end_time()))
            .collect();
        assert_eq!(free, vec![(t(0, 0), t(9, 0)), (t(10, 0), t(23, 30))]);
    }
}
