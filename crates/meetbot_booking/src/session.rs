// --- File: crates/meetbot_booking/src/session.rs ---
//! Per-sender slot offers.
//!
//! A sender has at most one [`PendingOffer`]. Offering again replaces it.
//! A numeric reply is resolved against the offer by 1-based position and the
//! offer stays in place until [`BookingSession::clear`] is called after a
//! successful booking.

use chrono::{DateTime, Duration, Utc};
use meetbot_common::{config_error, CandidateSlot, Clock, MeetbotError, SenderId, SystemClock};
use meetbot_config::BotConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// The slot list most recently offered to one sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOffer {
    pub sender_id: SenderId,
    /// Never empty. Ordinal `n` maps to `slots[n - 1]`.
    pub slots: Vec<CandidateSlot>,
    pub offered_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OfferError {
    #[error("cannot offer an empty slot list")]
    EmptySlots,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no active offer for this sender")]
    NoActiveOffer,
    #[error("slot number {ordinal} is not between 1 and {available}")]
    OutOfRange { ordinal: usize, available: usize },
}

/// Keyed storage for pending offers.
pub trait OfferStore: Send + Sync {
    fn put(&self, offer: PendingOffer);
    fn get(&self, sender: SenderId) -> Option<PendingOffer>;
    fn remove(&self, sender: SenderId) -> Option<PendingOffer>;
    /// Keeps only the offers `keep` accepts. Returns how many were dropped.
    fn retain(&self, keep: &dyn Fn(&PendingOffer) -> bool) -> usize;
}

/// Process-local offer storage. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryOfferStore {
    offers: RwLock<HashMap<SenderId, PendingOffer>>,
}

impl InMemoryOfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.offers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OfferStore for InMemoryOfferStore {
    fn put(&self, offer: PendingOffer) {
        self.offers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(offer.sender_id, offer);
    }

    fn get(&self, sender: SenderId) -> Option<PendingOffer> {
        self.offers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&sender)
            .cloned()
    }

    fn remove(&self, sender: SenderId) -> Option<PendingOffer> {
        self.offers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&sender)
    }

    fn retain(&self, keep: &dyn Fn(&PendingOffer) -> bool) -> usize {
        let mut offers = self.offers.write().unwrap_or_else(|e| e.into_inner());
        let before = offers.len();
        offers.retain(|_, offer| keep(offer));
        before - offers.len()
    }
}

/// Exclusive use of one sender's state. See [`BookingSession::lock_sender`].
pub struct SenderGuard<'a> {
    session: &'a BookingSession,
    sender: SenderId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SenderGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters clone the lock under the map mutex, so a count of one
        // here means nobody else can reach it.
        let mut locks = self.session.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.sender)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.sender);
        }
    }
}

/// Correlates numeric replies with the slots previously offered to a sender.
pub struct BookingSession {
    store: Arc<dyn OfferStore>,
    locks: Mutex<HashMap<SenderId, Arc<AsyncMutex<()>>>>,
    clock: Arc<dyn Clock>,
    ttl: Option<Duration>,
}

impl BookingSession {
    /// In-memory session. `ttl` of `None` keeps offers until cleared or replaced.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(InMemoryOfferStore::new()),
            locks: Mutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
            ttl,
        }
    }

    /// `offer_ttl_minutes = 0` disables expiry.
    pub fn from_config(config: &BotConfig) -> Result<Self, MeetbotError> {
        let ttl = match config.offer_ttl_minutes {
            0 => None,
            minutes => {
                let ttl = i64::try_from(minutes).ok().and_then(Duration::try_minutes);
                Some(ttl.ok_or_else(|| {
                    config_error(format!("bot.offer_ttl_minutes out of range: {}", minutes))
                })?)
            }
        };
        Ok(Self::new(ttl))
    }

    pub fn with_store(mut self, store: Arc<dyn OfferStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Waits for exclusive use of `sender`'s state.
    ///
    /// The message handler holds the guard while it handles one message, so
    /// two messages from the same sender never interleave.
    /// Dropping the guard forgets the sender's lock once nobody else holds
    /// or waits for it.
    pub async fn lock_sender(&self, sender: SenderId) -> SenderGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(sender).or_default().clone()
        };
        SenderGuard {
            session: self,
            sender,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of senders with a lock entry.
    pub fn tracked_senders(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Stores `slots` as the sender's offer and returns the `(ordinal, label)`
    /// lines to show.
    pub fn offer(
        &self,
        sender: SenderId,
        slots: Vec<CandidateSlot>,
    ) -> Result<Vec<(usize, String)>, OfferError> {
        if slots.is_empty() {
            return Err(OfferError::EmptySlots);
        }

        let listing = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index + 1, slot.display_label.clone()))
            .collect();

        self.store.put(PendingOffer {
            sender_id: sender,
            slots,
            offered_at: self.clock.now(),
        });
        debug!("Stored offer for sender {}", sender);
        Ok(listing)
    }

    /// Maps a 1-based `ordinal` to the offered slot. The offer is kept.
    pub fn resolve(
        &self,
        sender: SenderId,
        ordinal: usize,
    ) -> Result<CandidateSlot, SelectionError> {
        let offer = self.active_offer(sender).ok_or(SelectionError::NoActiveOffer)?;

        if ordinal == 0 || ordinal > offer.slots.len() {
            return Err(SelectionError::OutOfRange {
                ordinal,
                available: offer.slots.len(),
            });
        }
        Ok(offer.slots[ordinal - 1].clone())
    }

    /// Drops the sender's offer. Clearing an absent offer is a no-op.
    pub fn clear(&self, sender: SenderId) {
        if self.store.remove(sender).is_some() {
            debug!("Cleared offer for sender {}", sender);
        }
    }

    pub fn has_active_offer(&self, sender: SenderId) -> bool {
        self.active_offer(sender).is_some()
    }

    /// Removes every expired offer and the locks nobody is waiting on.
    /// Returns the number of offers removed.
    pub fn prune_expired(&self) -> usize {
        let removed = match self.ttl {
            Some(ttl) => {
                let now = self.clock.now();
                self.store.retain(&|offer| !is_expired(offer, now, ttl))
            }
            None => 0,
        };

        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        if removed > 0 {
            debug!("Pruned {} expired offers", removed);
        }
        removed
    }

    /// The sender's offer unless it has expired. An expired offer is dropped.
    fn active_offer(&self, sender: SenderId) -> Option<PendingOffer> {
        let offer = self.store.get(sender)?;
        match self.ttl {
            Some(ttl) if is_expired(&offer, self.clock.now(), ttl) => {
                debug!("Offer for sender {} expired", sender);
                self.store.remove(sender);
                None
            }
            _ => Some(offer),
        }
    }
}

fn is_expired(offer: &PendingOffer, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - offer.offered_at > ttl
}
