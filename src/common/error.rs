//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Slack identity lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Profile request for {user_id} failed: {source}")]
    Network {
        user_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Slack API rejected profile request for {user_id}: {error}")]
    Api { user_id: String, error: String },

    #[error("Profile lookup for {user_id} timed out")]
    Timeout { user_id: String },
}

/// Outbound delivery errors (either platform).
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Discord webhook failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Slack webhook returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Slack webhook request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Delivery to {target} timed out")]
    Timeout { target: &'static str },
}

/// Anything that can abort relaying a single message.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Slack request signature verification errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Request timestamp {timestamp} is too old (now {now})")]
    Stale { timestamp: i64, now: i64 },

    #[error("Signature mismatch")]
    Mismatch,
}
