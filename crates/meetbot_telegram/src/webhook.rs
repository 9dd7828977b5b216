// --- File: crates/meetbot_telegram/src/webhook.rs ---
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::Update;

/// Header Telegram fills with the secret given to setWebhook.
pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

pub struct WebhookState {
    sender: mpsc::Sender<Update>,
    secret_token: Option<String>,
}

impl WebhookState {
    pub fn new(sender: mpsc::Sender<Update>, secret_token: Option<String>) -> Self {
        Self {
            sender,
            secret_token,
        }
    }
}

/// Accepts one update pushed by Telegram and queues it for the message loop.
pub async fn telegram_webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(expected) = state.secret_token.as_deref() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected) {
            warn!("Rejected webhook call with a missing or wrong secret token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Failed to deserialize Telegram update: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload format").into_response();
        }
    };

    debug!("Webhook received update {}", update.update_id);
    match state.sender.send(update).await {
        Ok(()) => StatusCode::OK.into_response(),
        // Telegram retries non-2xx deliveries.
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
