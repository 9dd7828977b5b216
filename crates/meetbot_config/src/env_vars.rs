//! Environment variable handling for meetbot.
//!
//! Configuration values can be overridden with `MEETBOT__SECTION__KEY`
//! variables. Secrets are never written to config files: a value of
//! `"secret_from_env"` is replaced at load time by the matching secret
//! variable (`MEETBOT_SECRET_SECTION_KEY`, falling back to `SECTION_KEY`).

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "MEETBOT";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "MEETBOT_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value that requests injection from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"scheduling.work_start_hour"` becomes `"MEETBOT__SCHEDULING__WORK_START_HOUR"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"telegram.bot_token"` becomes `"MEETBOT_SECRET_TELEGRAM_BOT_TOKEN"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its short environment variable name
///
/// `"telegram.bot_token"` becomes `"TELEGRAM_BOT_TOKEN"`.
pub fn short_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Get an environment variable for a secret path, trying the prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(secret_path_to_env_var(path)) {
        return Some(value);
    }
    env::var(short_secret_path_to_env_var(path)).ok()
}

/// Recursively replaces every `"secret_from_env"` string with its secret
/// environment variable.
///
/// Returns the dotted paths that could not be resolved.
pub fn inject_env_secrets(value: &mut serde_json::Value) -> Vec<String> {
    use serde_json::Value;

    fn walk(path: Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_secret_env_var(&path_str) {
                    *s = env_val;
                } else {
                    warn!("env var for {} not found", path_str);
                    missing.push(path_str);
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(vec![], value, &mut missing);
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("scheduling.work_start_hour"),
            "MEETBOT__SCHEDULING__WORK_START_HOUR"
        );
        assert_eq!(
            config_path_to_env_var("gcal.calendar_id"),
            "MEETBOT__GCAL__CALENDAR_ID"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("telegram.bot_token"),
            "MEETBOT_SECRET_TELEGRAM_BOT_TOKEN"
        );
        assert_eq!(
            short_secret_path_to_env_var("telegram.bot_token"),
            "TELEGRAM_BOT_TOKEN"
        );
    }

    #[test]
    fn test_inject_env_secrets_replaces_marker() {
        env::set_var("MEETBOT_SECRET_TESTSECTION_INJECTED_TOKEN", "abc123");
        let mut value = json!({
            "testsection": { "injected_token": "secret_from_env", "plain": "keep" }
        });

        let missing = inject_env_secrets(&mut value);

        assert!(missing.is_empty());
        assert_eq!(value["testsection"]["injected_token"], "abc123");
        assert_eq!(value["testsection"]["plain"], "keep");
        env::remove_var("MEETBOT_SECRET_TESTSECTION_INJECTED_TOKEN");
    }

    #[test]
    fn test_inject_env_secrets_reports_missing() {
        let mut value = json!({ "nowhere": { "never_set_secret": "secret_from_env" } });

        let missing = inject_env_secrets(&mut value);

        assert_eq!(missing, vec!["nowhere.never_set_secret".to_string()]);
        assert_eq!(value["nowhere"]["never_set_secret"], SECRET_MARKER);
    }
}
