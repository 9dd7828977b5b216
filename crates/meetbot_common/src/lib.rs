// --- File: crates/meetbot_common/src/lib.rs ---

pub mod clock; // Injectable time source
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared data structures
pub mod services; // Collaborator abstractions
pub mod validation; // Input validation

// Re-export error types and utilities for easier access
pub use error::{
    api_error, auth_error, config_error, internal_error, transient_error, MeetbotError,
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{
    BookedMeeting, BusyInterval, CandidateSlot, EventRequest, InboundMessage, Sender, SenderId,
};
pub use services::{BoxFuture, CalendarService, MessageChannel};
