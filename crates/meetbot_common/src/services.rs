//! Service abstractions for external collaborators.
//!
//! The scheduling core only ever talks to these traits. Concrete providers
//! (Google Calendar, Telegram) live in their own crates and tests substitute
//! in-memory fakes.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

use crate::error::MeetbotError;
use crate::models::{BookedMeeting, BusyInterval, EventRequest, InboundMessage};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MeetbotError>> + Send + 'a>>;

/// Calendar operations needed to offer and book slots.
pub trait CalendarService: Send + Sync {
    /// Busy intervals overlapping `[start, end)`, sorted by start.
    ///
    /// Fails with [`MeetbotError::Auth`] or [`MeetbotError::TransientNetwork`]
    /// in the common cases. Callers treat any failure as "no slots".
    fn list_busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>>;

    /// Creates the event and returns its meeting link.
    ///
    /// An attendee email that fails validation is dropped, not reported.
    fn create_event(&self, request: EventRequest) -> BoxFuture<'_, BookedMeeting>;
}

/// A chat transport: inbound messages and replies to them.
pub trait MessageChannel: Send + Sync {
    /// Waits for the next batch of inbound messages. May return an empty batch.
    fn next_batch(&self) -> BoxFuture<'_, Vec<InboundMessage>>;

    /// Sends `text` to `chat_id`, threaded under `reply_to` when given.
    fn send_reply(&self, chat_id: i64, reply_to: Option<i64>, text: String) -> BoxFuture<'_, ()>;
}
