//! Configuration type definitions.

use std::time::Duration;

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub slack: SlackConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Slack workspace configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Bot token used for `users.profile.get`.
    pub bot_token: String,
    /// Signing secret used to verify Events API callbacks.
    pub signing_secret: String,
    /// Incoming webhook URL for Discord -> Slack messages.
    pub webhook_url: String,
    /// ID of the Slack channel relayed to Discord.
    pub channel_id: String,
    /// Channel field sent in webhook payloads.
    #[serde(default = "default_webhook_channel")]
    pub webhook_channel: String,
    /// Port the events endpoint listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the events endpoint.
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Base URL of the Slack Web API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token for the gateway connection.
    pub token: String,
    /// Webhook URL for Slack -> Discord messages.
    pub webhook_url: String,
    /// Name of the Discord channel relayed to Slack.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
}

/// Relay behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Resolve and log messages but never deliver them.
    #[serde(default)]
    pub log_only: bool,
    /// Upper bound for every lookup and delivery call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_only: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_webhook_channel() -> String {
    "#general".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_events_path() -> String {
    "/slack/events".to_string()
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_channel_name() -> String {
    "general".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}
