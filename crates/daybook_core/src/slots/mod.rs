//! Fixed-granularity slot grid and per-day slot tables.
//!
//! # Responsibility
//! - Quantize time-of-day onto a 15-minute grid of 96 slots.
//! - Validate half-open intervals before any slot is touched.
//! - Provide the `Day` table that enforces no-overlap.
//!
//! # Invariants
//! - Grid keys are `00:00` through `23:45`; there is no key for the next
//!   day's midnight.
//! - An interval end of `00:00` denotes midnight closing the same day.
//! - Intervals never wrap past midnight.

use crate::model::event::EventId;
use chrono::{NaiveTime, Timelike};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod day;

pub use day::Day;

/// Width of one slot in minutes.
pub const SLOT_MINUTES: u32 = 15;
/// Number of slots covering one day.
pub const SLOTS_PER_DAY: usize = 96;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors raised by slot grid validation and `Day` bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Time does not fall on a 15-minute boundary.
    Unaligned(NaiveTime),
    /// `start` is not strictly before `end`.
    InvalidInterval { start: NaiveTime, end: NaiveTime },
    /// Slot at `slot` is held by a different event.
    SlotNotAvailable { slot: NaiveTime, owner: EventId },
    /// Event owns no slot in this table.
    EventNotFound(EventId),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unaligned(time) => write!(
                f,
                "time {} is not aligned to the {SLOT_MINUTES}-minute grid",
                time.format("%H:%M:%S%.f")
            ),
            Self::InvalidInterval { start, end } => write!(
                f,
                "interval start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            Self::SlotNotAvailable { slot, owner } => write!(
                f,
                "slot {} is already held by event {owner}",
                slot.format("%H:%M")
            ),
            Self::EventNotFound(id) => write!(f, "event {id} holds no slot"),
        }
    }
}

impl Error for SlotError {}

/// Returns the grid index of an aligned time.
pub fn slot_index(time: NaiveTime) -> Result<usize, SlotError> {
    if time.second() != 0 || time.nanosecond() != 0 || time.minute() % SLOT_MINUTES != 0 {
        return Err(SlotError::Unaligned(time));
    }
    let minutes = time.hour() * 60 + time.minute();
    Ok((minutes / SLOT_MINUTES) as usize)
}

/// Returns the start time of slot `index`, wrapping past the last slot.
pub fn slot_time(index: usize) -> NaiveTime {
    let minutes = (index % SLOTS_PER_DAY) as u32 * SLOT_MINUTES;
    // Index is reduced modulo the grid, so the fallback is unreachable.
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default()
}

/// Advances one slot on the circular 24-hour axis.
///
/// `23:45` steps to `00:00`.
pub fn next_slot_time(time: NaiveTime) -> NaiveTime {
    let minutes = (time.hour() * 60 + time.minute() + SLOT_MINUTES) % MINUTES_PER_DAY;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default()
}

/// All 96 grid times in order, starting at `00:00`.
pub fn grid_times() -> impl Iterator<Item = NaiveTime> {
    std::iter::successors(Some(NaiveTime::default()), |time| {
        Some(next_slot_time(*time))
    })
    .take(SLOTS_PER_DAY)
}

/// Validated half-open run of slots `[first, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRange {
    first: usize,
    end: usize,
}

impl SlotRange {
    /// Validates `[start, end)` against the grid.
    ///
    /// # Errors
    /// - `Unaligned` when either bound is off-grid.
    /// - `InvalidInterval` when `start` is not before `end`. An `end` of
    ///   `00:00` is read as end of day, so `00:00..00:00` spans the whole day.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, SlotError> {
        let first = slot_index(start)?;
        let end_index = match slot_index(end)? {
            0 => SLOTS_PER_DAY,
            index => index,
        };
        if first >= end_index {
            return Err(SlotError::InvalidInterval { start, end });
        }
        Ok(Self {
            first,
            end: end_index,
        })
    }

    /// Every slot of the day, `00:00` to midnight.
    pub fn whole_day() -> Self {
        Self::from_indices(0, SLOTS_PER_DAY)
    }

    fn from_indices(first: usize, end: usize) -> Self {
        Self { first, end }
    }

    /// Index of the first slot.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Exclusive end index; `SLOTS_PER_DAY` when the run reaches midnight.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn start_time(&self) -> NaiveTime {
        slot_time(self.first)
    }

    /// Exclusive end as a time of day; `00:00` for end of day.
    pub fn end_time(&self) -> NaiveTime {
        slot_time(self.end)
    }

    /// Number of slots covered.
    pub fn len(&self) -> usize {
        self.end - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..self.end).contains(&index)
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.first..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::{grid_times, next_slot_time, slot_index, SlotError, SlotRange, SLOTS_PER_DAY};
    use chrono::NaiveTime;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn grid_covers_whole_day_without_next_midnight() {
        let times: Vec<_> = grid_times().collect();
        assert_eq!(times.len(), SLOTS_PER_DAY);
        assert_eq!(times[0], t(0, 0));
        assert_eq!(times[SLOTS_PER_DAY - 1], t(23, 45));
    }

    #[test]
    fn stepping_wraps_at_midnight() {
        assert_eq!(next_slot_time(t(23, 45)), t(0, 0));
        assert_eq!(next_slot_time(t(9, 45)), t(10, 0));
    }

    #[test]
    fn slot_index_rejects_off_grid_times() {
        assert_eq!(slot_index(t(9, 15)), Ok(37));
        assert_eq!(slot_index(t(9, 10)), Err(SlotError::Unaligned(t(9, 10))));
        let with_seconds = NaiveTime::from_hms_opt(9, 15, 30).unwrap();
        assert_eq!(
            slot_index(with_seconds),
            Err(SlotError::Unaligned(with_seconds))
        );
    }

    #[test]
    fn range_rejects_inverted_and_empty_intervals() {
        assert_eq!(
            SlotRange::new(t(10, 0), t(10, 0)),
            Err(SlotError::InvalidInterval {
                start: t(10, 0),
                end: t(10, 0)
            })
        );
        assert!(SlotRange::new(t(10, 0), t(9, 0)).is_err());
    }

    #[test]
    fn midnight_end_reaches_last_slot() {
        let range = SlotRange::new(t(23, 30), t(0, 0)).unwrap();
        assert_eq!(range.len(), 2);
        assert!(range.contains(SLOTS_PER_DAY - 1));
        assert_eq!(range.end_time(), t(0, 0));

        let whole_day = SlotRange::new(t(0, 0), t(0, 0)).unwrap();
        assert_eq!(whole_day.len(), SLOTS_PER_DAY);
    }
}
