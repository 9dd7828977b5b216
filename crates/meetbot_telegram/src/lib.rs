// --- File: crates/meetbot_telegram/src/lib.rs ---
pub mod channel;
pub mod client;
pub mod models;
#[cfg(test)]
mod models_test;
pub mod routes;
pub mod webhook;

pub use channel::TelegramChannel;
pub use client::BotApi;
pub use webhook::WebhookState;
