// --- File: crates/meetbot_telegram/src/models.rs ---
// The subset of Bot API types meetbot reads and writes.

use meetbot_common::{InboundMessage, Sender};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Update {
    /// Maps a `message` update onto the transport-neutral form.
    ///
    /// Other update kinds and messages without an author (channel posts)
    /// yield `None`. A message without text is kept so the handler decides.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let from = message.from?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            message_id: message.message_id,
            sender: Sender {
                id: from.id,
                first_name: Some(from.first_name).filter(|name| !name.is_empty()),
                is_bot: from.is_bot,
            },
            text: message.text,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    /// Still send when the original message was deleted meanwhile.
    pub allow_sending_without_reply: bool,
}

#[derive(Serialize, Debug)]
pub struct SetWebhookRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
    pub allowed_updates: Vec<String>,
}
