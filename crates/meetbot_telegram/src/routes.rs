// --- File: crates/meetbot_telegram/src/routes.rs ---

use crate::webhook::{telegram_webhook_handler, WebhookState};
use axum::{routing::post, Router};
use std::sync::Arc;

pub const WEBHOOK_PATH: &str = "/telegram/webhook";

/// Creates a router containing the Telegram webhook route.
pub fn routes(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(telegram_webhook_handler))
        .with_state(state)
}
