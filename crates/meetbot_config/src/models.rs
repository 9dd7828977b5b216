// --- File: crates/meetbot_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Bot Behaviour Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BotConfig {
    /// Chat ids the bot listens to. Messages from any other chat are ignored.
    #[serde(default)]
    pub monitored_chats: Vec<i64>,
    /// Case-insensitive substrings that trigger a slot offer.
    #[serde(default = "default_trigger_keywords")]
    pub trigger_keywords: Vec<String>,
    /// Prefix of the created event's title, followed by the sender's first name.
    #[serde(default = "default_meeting_title_prefix")]
    pub meeting_title_prefix: String,
    /// Pending offers older than this are treated as absent. 0 disables expiry.
    #[serde(default = "default_offer_ttl_minutes")]
    pub offer_ttl_minutes: u64,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            monitored_chats: Vec::new(),
            trigger_keywords: default_trigger_keywords(),
            meeting_title_prefix: default_meeting_title_prefix(),
            offer_ttl_minutes: default_offer_ttl_minutes(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

fn default_trigger_keywords() -> Vec<String> {
    ["meeting", "встреча", "созвон", "наберу"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_meeting_title_prefix() -> String {
    "Meeting with".to_string()
}

fn default_offer_ttl_minutes() -> u64 {
    24 * 60
}

fn default_prune_interval_secs() -> u64 {
    600
}

// --- Scheduling Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    pub work_start_hour: u32, // 0-23, local to time_zone
    pub work_end_hour: u32,   // 0-23, exclusive bound on a slot's start hour
    pub meeting_duration_minutes: u32,
    #[serde(default = "default_slot_step_minutes")]
    pub slot_step_minutes: u32,
    pub look_ahead_days: u32,
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
    pub time_zone: String, // IANA name, e.g. "Europe/Moscow"
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            work_start_hour: 9,
            work_end_hour: 18,
            meeting_duration_minutes: 30,
            slot_step_minutes: default_slot_step_minutes(),
            look_ahead_days: 7,
            max_slots: default_max_slots(),
            time_zone: "Europe/Moscow".to_string(),
        }
    }
}

fn default_slot_step_minutes() -> u32 {
    30
}

fn default_max_slots() -> usize {
    5
}

// --- Google Calendar Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Path of the credential blob (service account or authorized user JSON).
    pub credentials_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

// --- Telegram Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookConfig {
    pub host: String,
    pub port: u16,
    /// Compared against the X-Telegram-Bot-Api-Secret-Token header when set.
    #[serde(default)]
    pub secret_token: Option<String>,
    /// Public HTTPS URL registered with Telegram via setWebhook at startup.
    /// Leave unset when the webhook is registered out of band.
    #[serde(default)]
    pub public_url: Option<String>,
}

// Holds non-secret Telegram config. The bot token is usually "secret_from_env",
// resolved from TELEGRAM_BOT_TOKEN.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub mode: TransportMode,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for the rolling log file. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default)]
    pub journald: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            max_log_files: default_max_log_files(),
            journald: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    7
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    pub gcal: GcalConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub log: LogConfig,
}
