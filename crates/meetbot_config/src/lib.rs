use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::str::FromStr;
use tracing::{debug, warn};

pub mod env_vars;
pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Reads `config/default` and `config/{RUN_ENV}` (both optional, any format
/// the `config` crate understands), then `MEETBOT__*` environment overrides,
/// then resolves `secret_from_env` markers and validates the result.
/// `MEETBOT_CONFIG_DIR` points at a different config directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("MEETBOT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    load_config_from(&config_dir, &run_env)
}

/// Loads configuration from an explicit directory and run environment.
pub fn load_config_from(config_dir: &str, run_env: &str) -> Result<AppConfig, ConfigError> {
    let prefix = env_vars::get_config_prefix();

    let default_path = format!("{}/default", config_dir);
    let env_path = format!("{}/{}", config_dir, run_env);
    debug!("config: default_path={} env_path={}", default_path, env_path);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path).required(false))
        .add_source(File::with_name(&env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("bot.monitored_chats")
                .with_list_parse_key("bot.trigger_keywords"),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    let config = apply_env_overrides_from_marker(raw_config)?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    let missing = env_vars::inject_env_secrets(&mut json);
    if !missing.is_empty() {
        return Err(ConfigError::Message(format!(
            "missing secrets in environment: {}",
            missing.join(", ")
        )));
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

/// Upper bound for `bot.offer_ttl_minutes`.
pub const MAX_OFFER_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Checks the invariants the rest of the application relies on.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let s = &config.scheduling;
    if s.work_start_hour > 23 || s.work_end_hour > 23 {
        return Err(invalid("scheduling working hours must be within 0-23"));
    }
    if s.work_start_hour >= s.work_end_hour {
        return Err(invalid("scheduling.work_start_hour must be before work_end_hour"));
    }
    if s.meeting_duration_minutes == 0 {
        return Err(invalid("scheduling.meeting_duration_minutes must be positive"));
    }
    if s.slot_step_minutes == 0 {
        return Err(invalid("scheduling.slot_step_minutes must be positive"));
    }
    if s.look_ahead_days == 0 {
        return Err(invalid("scheduling.look_ahead_days must be positive"));
    }
    if s.max_slots == 0 {
        return Err(invalid("scheduling.max_slots must be positive"));
    }
    if Tz::from_str(&s.time_zone).is_err() {
        return Err(invalid(format!(
            "scheduling.time_zone is not an IANA time zone: {}",
            s.time_zone
        )));
    }

    if config.telegram.bot_token.trim().is_empty() {
        return Err(invalid(format!(
            "telegram.bot_token is not configured, set TELEGRAM_BOT_TOKEN or {}",
            env_vars::config_path_to_env_var("telegram.bot_token")
        )));
    }
    if config.telegram.mode == TransportMode::Webhook && config.telegram.webhook.is_none() {
        return Err(invalid("telegram.mode = \"webhook\" requires a [telegram.webhook] section"));
    }
    if config.bot.offer_ttl_minutes > MAX_OFFER_TTL_MINUTES {
        return Err(invalid(format!(
            "bot.offer_ttl_minutes must be at most {} (one year)",
            MAX_OFFER_TTL_MINUTES
        )));
    }
    if config.gcal.request_timeout_secs == 0 {
        return Err(invalid("gcal.request_timeout_secs must be positive"));
    }

    if config.bot.monitored_chats.is_empty() {
        warn!("No monitored chats configured");
    }
    if config.bot.trigger_keywords.is_empty() {
        warn!("No trigger keywords configured, slots will never be offered");
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Message(message.into())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// `DOTENV_OVERRIDE` selects the file, otherwise a first CLI argument starting
/// with `.env`, otherwise `.env`. Loading happens at most once per process.
/// Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn sample_config() -> AppConfig {
        AppConfig {
            bot: BotConfig {
                monitored_chats: vec![-100123],
                ..BotConfig::default()
            },
            scheduling: SchedulingConfig::default(),
            gcal: GcalConfig {
                calendar_id: "primary".to_string(),
                credentials_path: "credentials.json".to_string(),
                request_timeout_secs: 15,
            },
            telegram: TelegramConfig {
                bot_token: "123:abc".to_string(),
                api_base_url: "https://api.telegram.org".to_string(),
                mode: TransportMode::Polling,
                poll_timeout_secs: 30,
                webhook: None,
            },
            log: LogConfig::default(),
        }
    }

    fn temp_config_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("meetbot-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&sample_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let mut config = sample_config();
        config.scheduling.work_start_hour = 18;
        config.scheduling.work_end_hour = 9;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_hour_out_of_range() {
        let mut config = sample_config();
        config.scheduling.work_end_hour = 24;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_duration_and_look_ahead() {
        let mut config = sample_config();
        config.scheduling.meeting_duration_minutes = 0;
        assert!(validate(&config).is_err());

        let mut config = sample_config();
        config.scheduling.look_ahead_days = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_time_zone() {
        let mut config = sample_config();
        config.scheduling.time_zone = "Mars/Olympus".to_string();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("Mars/Olympus"), "unexpected error: {}", err);
    }

    #[test]
    fn test_validate_names_token_variables() {
        let mut config = sample_config();
        config.telegram.bot_token = "  ".to_string();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("TELEGRAM_BOT_TOKEN"), "unexpected error: {}", err);
        assert!(err.contains("__TELEGRAM__BOT_TOKEN"), "unexpected error: {}", err);
    }

    #[test]
    fn test_validate_bounds_offer_ttl() {
        let mut config = sample_config();
        config.bot.offer_ttl_minutes = MAX_OFFER_TTL_MINUTES;
        assert!(validate(&config).is_ok());

        config.bot.offer_ttl_minutes = MAX_OFFER_TTL_MINUTES + 1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("offer_ttl_minutes"), "unexpected error: {}", err);

        config.bot.offer_ttl_minutes = u64::MAX;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_requires_webhook_section() {
        let mut config = sample_config();
        config.telegram.mode = TransportMode::Webhook;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_config_from_toml_with_defaults() {
        let dir = temp_config_dir("defaults");
        fs::write(
            dir.join("default.toml"),
            r#"
[bot]
monitored_chats = [-1001, 42]

[scheduling]
work_start_hour = 10
work_end_hour = 17
meeting_duration_minutes = 45
look_ahead_days = 3
time_zone = "Europe/Zurich"

[gcal]
credentials_path = "token.json"

[telegram]
bot_token = "123:abc"
"#,
        )
        .unwrap();

        let config = load_config_from(dir.to_str().unwrap(), "test-none").unwrap();

        assert_eq!(config.bot.monitored_chats, vec![-1001, 42]);
        assert_eq!(config.scheduling.work_start_hour, 10);
        assert_eq!(config.scheduling.slot_step_minutes, 30);
        assert_eq!(config.scheduling.max_slots, 5);
        assert_eq!(config.gcal.calendar_id, "primary");
        assert_eq!(config.telegram.mode, TransportMode::Polling);
        assert!(config.bot.trigger_keywords.iter().any(|k| k == "встреча"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_config_from_fails_on_missing_secret() {
        let dir = temp_config_dir("secret");
        fs::write(
            dir.join("default.toml"),
            r#"
[scheduling]
work_start_hour = 9
work_end_hour = 18
meeting_duration_minutes = 30
look_ahead_days = 7
time_zone = "Europe/Moscow"

[gcal]
credentials_path = "token.json"

[telegram]
bot_token = "secret_from_env"
mode = "polling"
"#,
        )
        .unwrap();
        // Make sure neither secret name is present for this run.
        env::remove_var("MEETBOT_SECRET_TELEGRAM_BOT_TOKEN");
        env::remove_var("TELEGRAM_BOT_TOKEN");

        let result = load_config_from(dir.to_str().unwrap(), "test-none");

        assert!(result.is_err());
        fs::remove_dir_all(dir).ok();
    }
}
