//! Calendar domain model.
//!
//! # Responsibility
//! - Define the event and reminder records owned by a `Calendar`.
//! - Keep reminder bookkeeping on the event itself.
//!
//! # Invariants
//! - Every event is identified by a stable `EventId` assigned once.
//! - Reminders have no identity of their own; they are addressed by
//!   position inside their event.

pub mod event;
pub mod reminder;
