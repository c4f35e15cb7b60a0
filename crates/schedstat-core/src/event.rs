//! Raw calendar events and their classified form.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::session_type::{LocationCategory, SessionType};

/// A single calendar entry as produced by the calendar parser.
///
/// Timestamps are wall-clock values as the parser resolved them; no timezone
/// conversion happens past that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Event summary text. May be empty when the calendar entry had none.
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl RawEvent {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }
}

/// Why an event could not be classified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The event has no usable title.
    #[error("event starting at {start} has an empty title")]
    EmptyTitle { start: NaiveDateTime },
}

/// A calendar event with its meaning extracted from the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSession {
    /// Subject name, the part of the title before the type tag.
    pub subject: String,
    pub session_type: SessionType,
    pub location: LocationCategory,
    /// Instructor from the `Prowadzący:` segment, if present.
    pub instructor: Option<String>,
    /// Room from the `Sala:` segment, if present.
    pub room: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Never negative; an end before the start yields zero.
    pub duration: Duration,
}
