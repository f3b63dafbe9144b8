//! Reminder value type.
//!
//! # Responsibility
//! - Describe when and how a notification fires for an event.
//!
//! # Invariants
//! - `kind` is always one of the closed `ReminderKind` variants; unknown
//!   wire values are rejected at parse/deserialize time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Delivery channel for a reminder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Notify by email.
    #[default]
    Email,
    /// Notify through the local system notification center.
    System,
}

impl ReminderKind {
    /// Stable lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::System => "system",
        }
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known `ReminderKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReminderKindError(pub String);

impl Display for ParseReminderKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported reminder kind `{}`; expected email|system",
            self.0
        )
    }
}

impl Error for ParseReminderKindError {}

impl FromStr for ReminderKind {
    type Err = ParseReminderKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "system" => Ok(Self::System),
            _ => Err(ParseReminderKindError(value.to_string())),
        }
    }
}

/// Notification attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Local date-time when the notification should trigger.
    pub fire_at: NaiveDateTime,
    /// Delivery channel.
    pub kind: ReminderKind,
}

impl Reminder {
    pub fn new(fire_at: NaiveDateTime, kind: ReminderKind) -> Self {
        Self { fire_at, kind }
    }
}

impl Display for Reminder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} reminder at {}",
            self.kind,
            self.fire_at.format("%Y-%m-%d %H:%M")
        )
    }
}
