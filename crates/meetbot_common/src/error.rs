// --- File: crates/meetbot_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all meetbot crates.
///
/// Collaborator adapters (calendar, chat transport) convert their own errors
/// into one of these variants so the message handler can decide how to
/// degrade without knowing which provider failed.
#[derive(Error, Debug)]
pub enum MeetbotError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials missing, expired or rejected by the provider.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Timeouts, connection resets and provider-side 5xx responses.
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// The provider understood the request and refused it.
    #[error("External API error: {service_name} - {message}")]
    Api {
        service_name: String,
        message: String,
    },

    /// The chat transport could not deliver or fetch messages.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeetbotError {
    /// Whether the failure is worth logging at error level.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MeetbotError::Config(_) | MeetbotError::Auth(_))
    }
}

// Common error conversions
impl From<reqwest::Error> for MeetbotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return MeetbotError::TransientNetwork(err.to_string());
        }
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                MeetbotError::Auth(err.to_string())
            }
            Some(status) if status.is_server_error() => {
                MeetbotError::TransientNetwork(err.to_string())
            }
            _ => MeetbotError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for MeetbotError {
    fn from(err: serde_json::Error) -> Self {
        MeetbotError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for MeetbotError {
    fn from(err: std::io::Error) -> Self {
        MeetbotError::Internal(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> MeetbotError {
    MeetbotError::Config(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> MeetbotError {
    MeetbotError::Auth(message.to_string())
}

pub fn transient_error<T: fmt::Display>(message: T) -> MeetbotError {
    MeetbotError::TransientNetwork(message.to_string())
}

pub fn api_error<T: fmt::Display>(service_name: &str, message: T) -> MeetbotError {
    MeetbotError::Api {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> MeetbotError {
    MeetbotError::Internal(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            api_error("gcal", "quota exceeded").to_string(),
            "External API error: gcal - quota exceeded"
        );
        assert_eq!(
            transient_error("timed out").to_string(),
            "Transient network error: timed out"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(config_error("x").is_fatal());
        assert!(auth_error("x").is_fatal());
        assert!(!transient_error("x").is_fatal());
        assert!(!internal_error("x").is_fatal());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(MeetbotError::from(err), MeetbotError::Parse(_)));
    }
}
