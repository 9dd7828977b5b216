// --- File: crates/meetbot_booking/src/handlers.rs ---
use meetbot_common::{
    CalendarService, EventRequest, InboundMessage, MeetbotError, MessageChannel, Sender, SenderId,
};
use meetbot_config::AppConfig;
use meetbot_gcal::SlotFinder;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::replies;
use crate::session::BookingSession;

/// Pause after a failed batch fetch before asking the channel again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// What an inbound text asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A numeric reply to an offer, optionally followed by an email.
    Select {
        ordinal: usize,
        attendee_email: Option<String>,
    },
    /// A trigger keyword: offer slots.
    Suggest,
    Ignore,
}

/// Classifies already trimmed, lower-cased text.
///
/// Leading digits count as a selection only when the sender has an active
/// offer, and that check runs before keyword matching. A number too large
/// for `usize` still selects, and is later rejected as out of range.
pub fn classify(text: &str, has_active_offer: bool, keywords: &[String]) -> Intent {
    if has_active_offer {
        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        if digits_end > 0 {
            let ordinal = text[..digits_end].parse().unwrap_or(usize::MAX);
            let attendee_email = text[digits_end..]
                .split_whitespace()
                .find(|word| word.contains('@'))
                .map(|word| {
                    word.trim_matches(|c: char| matches!(c, ',' | ';' | '<' | '>'))
                        .to_string()
                });
            return Intent::Select {
                ordinal,
                attendee_email,
            };
        }
    }

    if keywords.iter().any(|keyword| text.contains(keyword.as_str())) {
        Intent::Suggest
    } else {
        Intent::Ignore
    }
}

/// Behaviour knobs of [`MessageHandler`], taken from configuration.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub monitored_chats: HashSet<i64>,
    /// Stored lower-cased.
    pub trigger_keywords: Vec<String>,
    pub meeting_title_prefix: String,
    /// IANA zone stored on created events.
    pub time_zone: String,
}

impl HandlerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            monitored_chats: config.bot.monitored_chats.iter().copied().collect(),
            trigger_keywords: config
                .bot
                .trigger_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            meeting_title_prefix: config.bot.meeting_title_prefix.clone(),
            time_zone: config.scheduling.time_zone.clone(),
        }
    }
}

/// Turns inbound messages into slot offers and bookings.
pub struct MessageHandler {
    settings: HandlerSettings,
    finder: SlotFinder,
    calendar: Arc<dyn CalendarService>,
    session: Arc<BookingSession>,
}

impl MessageHandler {
    pub fn new(
        settings: HandlerSettings,
        finder: SlotFinder,
        calendar: Arc<dyn CalendarService>,
        session: Arc<BookingSession>,
    ) -> Self {
        Self {
            settings,
            finder,
            calendar,
            session,
        }
    }

    pub fn session(&self) -> &Arc<BookingSession> {
        &self.session
    }

    /// Handles one message and returns the reply to send, if any.
    ///
    /// Every failure is turned into a reply here. Holds the sender's lock
    /// for the whole call.
    pub async fn handle(&self, message: &InboundMessage) -> Option<String> {
        if !self.settings.monitored_chats.contains(&message.chat_id) {
            debug!("Ignoring message from unmonitored chat {}", message.chat_id);
            return None;
        }
        if message.sender.is_bot {
            return None;
        }
        let text = message.text.as_deref()?.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        let sender = message.sender.id;
        let _guard = self.session.lock_sender(sender).await;

        let intent = classify(
            &text,
            self.session.has_active_offer(sender),
            &self.settings.trigger_keywords,
        );
        match intent {
            Intent::Select {
                ordinal,
                attendee_email,
            } => {
                info!("Sender {} selected slot {}", sender, ordinal);
                Some(self.book(&message.sender, ordinal, attendee_email).await)
            }
            Intent::Suggest => {
                info!(
                    "Processing meeting request from sender {} in chat {}",
                    sender, message.chat_id
                );
                Some(self.suggest(sender).await)
            }
            Intent::Ignore => None,
        }
    }

    /// Handles `message` and delivers the reply, threaded under the original.
    pub async fn dispatch(&self, channel: &dyn MessageChannel, message: InboundMessage) {
        let Some(reply) = self.handle(&message).await else {
            return;
        };
        if let Err(e) = channel
            .send_reply(message.chat_id, Some(message.message_id), reply)
            .await
        {
            warn!("Failed to send reply to chat {}: {}", message.chat_id, e);
        }
    }

    async fn suggest(&self, sender: SenderId) -> String {
        let slots = match self.finder.find_slots(self.calendar.as_ref()).await {
            Ok(slots) => slots,
            Err(e) => {
                log_calendar_failure(&e, "Listing busy intervals failed");
                Vec::new()
            }
        };

        match self.session.offer(sender, slots) {
            Ok(listing) => {
                info!("Offered {} slots to sender {}", listing.len(), sender);
                replies::offer(&listing)
            }
            Err(_) => {
                info!("No free slots for sender {}", sender);
                replies::NO_SLOTS.to_string()
            }
        }
    }

    async fn book(
        &self,
        sender: &Sender,
        ordinal: usize,
        attendee_email: Option<String>,
    ) -> String {
        let slot = match self.session.resolve(sender.id, ordinal) {
            Ok(slot) => slot,
            Err(e) => {
                info!("Rejected selection from sender {}: {}", sender.id, e);
                return replies::selection_error(&e);
            }
        };

        let title = format!(
            "{} {}",
            self.settings.meeting_title_prefix,
            sender.first_name.as_deref().unwrap_or("user")
        );
        let mut request = EventRequest::for_slot(&slot, title, self.settings.time_zone.clone());
        if let Some(email) = attendee_email {
            request = request.with_attendee(email);
        }

        match self.calendar.create_event(request).await {
            Ok(booked) => {
                self.session.clear(sender.id);
                info!(
                    "Meeting booked for sender {} at {} (event {:?})",
                    sender.id, slot.start, booked.event_id
                );
                replies::booked(&slot.display_label, booked.meeting_link.as_deref())
            }
            Err(e) => {
                log_calendar_failure(&e, "Creating the event failed");
                replies::BOOKING_FAILED.to_string()
            }
        }
    }
}

fn log_calendar_failure(err: &MeetbotError, context: &str) {
    if err.is_fatal() {
        error!("{}: {}", context, err);
    } else {
        warn!("{}: {}", context, err);
    }
}

/// Pulls batches from `channel` and handles each message on its own task.
///
/// Returns only on a fatal channel error, e.g. a misconfigured transport.
/// Other fetch failures are logged and retried after a short pause.
pub async fn run_message_loop(
    channel: Arc<dyn MessageChannel>,
    handler: Arc<MessageHandler>,
) -> Result<(), MeetbotError> {
    loop {
        let batch = match channel.next_batch().await {
            Ok(batch) => batch,
            Err(e) if e.is_fatal() => {
                error!("Message channel failed: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("Fetching messages failed, retrying: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for message in batch {
            let channel = channel.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                handler.dispatch(channel.as_ref(), message).await;
            });
        }
    }
}
