// --- File: crates/meetbot_common/src/models.rs ---

// Data structures shared between the calendar, booking and transport crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range already occupied on the calendar.
///
/// Intervals are half-open: `[start, end)`. Two intervals conflict iff
/// `a.start < b.end && b.start < a.end`, so back-to-back ranges never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Strict half-open intersection test.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// A bookable meeting window offered to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Human readable start in the configured time zone. Never parsed back.
    pub display_label: String,
}

/// Identifies the author of an inbound message.
pub type SenderId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: SenderId,
    pub first_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// A transport-neutral inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender: Sender,
    pub text: Option<String>,
}

/// Request to materialize a meeting in the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    /// Attached only when it passes [`crate::validation::is_valid_email`].
    pub attendee_email: Option<String>,
    /// IANA zone name stored on the event.
    pub time_zone: String,
}

impl EventRequest {
    pub fn for_slot(
        slot: &CandidateSlot,
        title: impl Into<String>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
            title: title.into(),
            attendee_email: None,
            time_zone: time_zone.into(),
        }
    }

    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        self.attendee_email = Some(email.into());
        self
    }
}

/// Result of a successful event creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedMeeting {
    pub event_id: Option<String>,
    /// Video conference URI, or the event page when no conference was attached.
    pub meeting_link: Option<String>,
}
