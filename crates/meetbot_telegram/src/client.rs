// --- File: crates/meetbot_telegram/src/client.rs ---
use meetbot_common::http::create_client;
use meetbot_common::{api_error, auth_error, config_error, transient_error, MeetbotError};
use meetbot_config::TelegramConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::{
    ApiResponse, GetUpdatesRequest, Message, SendMessageRequest,
    SetWebhookRequest, Update, User,
};

const SERVICE_NAME: &str = "telegram";

/// Headroom on top of the long-poll window before the HTTP client gives up.
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 10;

/// Thin client for the Telegram Bot API.
///
/// The token is part of every request URL, so URLs are stripped from
/// transport errors before they reach the logs.
#[derive(Clone)]
pub struct BotApi {
    client: Client,
    base_url: String,
    token: String,
}

impl BotApi {
    pub fn new(config: &TelegramConfig) -> Result<Self, MeetbotError> {
        let client = create_client(config.poll_timeout_secs + CLIENT_TIMEOUT_MARGIN_SECS, true)
            .map_err(|e| config_error(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, MeetbotError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| MeetbotError::from(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MeetbotError::from(e.without_url()))?;

        let parsed: ApiResponse<R> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(classify_failure(
                    status.as_u16(),
                    format!("{} returned HTTP {}", method, status),
                ));
            }
            Err(e) => return Err(MeetbotError::Parse(format!("{} response: {}", method, e))),
        };

        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(MeetbotError::Parse(format!("{} returned no result", method))),
            (false, _) => {
                let code = parsed.error_code.unwrap_or(status.as_u16());
                let description = parsed
                    .description
                    .unwrap_or_else(|| "no description".to_string());
                Err(classify_failure(code, format!("{}: {}", method, description)))
            }
        }
    }

    /// Identifies the bot. Used at startup to check the token.
    pub async fn get_me(&self) -> Result<User, MeetbotError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for updates with ids at or above `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, MeetbotError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        debug!("getUpdates returned {} updates", updates.len());
        Ok(updates)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        text: String,
    ) -> Result<Message, MeetbotError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id: reply_to,
            allow_sending_without_reply: true,
        };
        self.call("sendMessage", &request).await
    }

    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<(), MeetbotError> {
        let request = SetWebhookRequest {
            url: url.to_string(),
            secret_token: secret_token.map(str::to_string),
            allowed_updates: vec!["message".to_string()],
        };
        let _: bool = self.call("setWebhook", &request).await?;
        info!("Registered Telegram webhook at {}", url);
        Ok(())
    }
}

/// Maps a Bot API error code onto the shared error taxonomy.
pub fn classify_failure(code: u16, message: String) -> MeetbotError {
    match code {
        // Telegram answers an unknown token with 404.
        401 | 404 => auth_error(message),
        409 => config_error(format!(
            "{} (a webhook is registered or another instance is polling)",
            message
        )),
        429 | 500..=599 => transient_error(message),
        _ => api_error(SERVICE_NAME, message),
    }
}
