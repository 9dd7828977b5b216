// --- File: crates/meetbot_booking/src/lib.rs ---
pub mod handlers;
pub mod replies;
pub mod session;
#[cfg(test)]
mod session_proptest;

pub use handlers::{run_message_loop, HandlerSettings, Intent, MessageHandler};
pub use session::{
    BookingSession, InMemoryOfferStore, OfferError, OfferStore, PendingOffer, SelectionError,
    SenderGuard,
};
