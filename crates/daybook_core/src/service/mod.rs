//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate event and slot bookkeeping behind one aggregate root.
//! - Define the seams for external collaborators (id generation, clock).

pub mod calendar;
pub mod clock;
pub mod id_gen;
