//! Event id generation seam.
//!
//! # Invariants
//! - Generated ids are unique for the lifetime of one `Calendar`.

use crate::model::event::EventId;
use uuid::Uuid;

/// Produces identifiers for new events.
pub trait IdGenerator {
    fn next_id(&mut self) -> EventId;
}

/// Random UUID v4 ids in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> EventId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids for tests and fixtures.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("evt")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> EventId {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
