// --- File: crates/meetbot_telegram/src/channel.rs ---
//! Telegram as a [`MessageChannel`].
//!
//! Updates arrive either by long polling `getUpdates` or through the webhook
//! route, which forwards them over a bounded queue. Replies always go out
//! through `sendMessage`.

use meetbot_common::{BoxFuture, InboundMessage, MeetbotError, MessageChannel};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::client::BotApi;
use crate::models::Update;
use crate::webhook::WebhookState;

/// Upper bound on updates handed out per webhook batch.
const MAX_WEBHOOK_BATCH: usize = 100;

/// Webhook deliveries buffered before the route starts waiting.
const WEBHOOK_QUEUE_CAPACITY: usize = 256;

enum UpdateSource {
    Polling {
        /// Next `update_id` to ask for. Acknowledges everything below it.
        offset: Mutex<i64>,
        timeout_secs: u64,
    },
    Webhook {
        receiver: Mutex<mpsc::Receiver<Update>>,
    },
}

pub struct TelegramChannel {
    api: BotApi,
    source: UpdateSource,
}

impl TelegramChannel {
    pub fn polling(api: BotApi, timeout_secs: u64) -> Self {
        Self {
            api,
            source: UpdateSource::Polling {
                offset: Mutex::new(0),
                timeout_secs,
            },
        }
    }

    /// Creates the channel together with the state the webhook route needs.
    pub fn webhook(api: BotApi, secret_token: Option<String>) -> (Self, Arc<WebhookState>) {
        let (sender, receiver) = mpsc::channel(WEBHOOK_QUEUE_CAPACITY);
        let channel = Self {
            api,
            source: UpdateSource::Webhook {
                receiver: Mutex::new(receiver),
            },
        };
        (channel, Arc::new(WebhookState::new(sender, secret_token)))
    }

    pub fn api(&self) -> &BotApi {
        &self.api
    }

    async fn poll(
        &self,
        offset: &Mutex<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, MeetbotError> {
        let mut offset = offset.lock().await;
        let updates = self.api.get_updates(*offset, timeout_secs).await?;
        if let Some(last) = updates.iter().map(|update| update.update_id).max() {
            *offset = last + 1;
        }
        Ok(updates)
    }

    async fn drain(
        &self,
        receiver: &Mutex<mpsc::Receiver<Update>>,
    ) -> Result<Vec<Update>, MeetbotError> {
        let mut receiver = receiver.lock().await;
        let Some(first) = receiver.recv().await else {
            return Err(MeetbotError::Transport("webhook queue closed".to_string()));
        };

        let mut updates = vec![first];
        while updates.len() < MAX_WEBHOOK_BATCH {
            match receiver.try_recv() {
                Ok(update) => updates.push(update),
                Err(_) => break,
            }
        }
        Ok(updates)
    }
}

impl MessageChannel for TelegramChannel {
    fn next_batch(&self) -> BoxFuture<'_, Vec<InboundMessage>> {
        Box::pin(async move {
            let updates = match &self.source {
                UpdateSource::Polling {
                    offset,
                    timeout_secs,
                } => self.poll(offset, *timeout_secs).await?,
                UpdateSource::Webhook { receiver } => self.drain(receiver).await?,
            };

            let received = updates.len();
            let messages: Vec<InboundMessage> =
                updates.into_iter().filter_map(Update::into_inbound).collect();
            if received > messages.len() {
                debug!("Skipped {} non-message updates", received - messages.len());
            }
            Ok(messages)
        })
    }

    fn send_reply(&self, chat_id: i64, reply_to: Option<i64>, text: String) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.api.send_message(chat_id, reply_to, text).await?;
            Ok(())
        })
    }
}
