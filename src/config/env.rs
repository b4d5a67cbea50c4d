//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `FERRYMAN_DISCORD_TOKEN` - Discord bot token
//! - `FERRYMAN_DISCORD_WEBHOOK_URL` - Discord webhook URL
//! - `FERRYMAN_SLACK_BOT_TOKEN` - Slack bot token
//! - `FERRYMAN_SLACK_SIGNING_SECRET` - Slack signing secret
//! - `FERRYMAN_SLACK_WEBHOOK_URL` - Slack incoming webhook URL
//! - `FERRYMAN_SLACK_CHANNEL_ID` - Slack channel relayed to Discord
//! - `FERRYMAN_LOG_ONLY` - `true`/`1` to suppress deliveries
//! - `PORT` - events endpoint port

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "FERRYMAN";

/// Apply environment variable overrides to a config.
///
/// This allows tokens, secrets and webhook URLs to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name: &str| env::var(name).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    let prefixed = |name: &str| var(&format!("{}_{}", ENV_PREFIX, name));

    // Discord
    if let Some(token) = prefixed("DISCORD_TOKEN") {
        config.discord.token = token;
    }
    if let Some(url) = prefixed("DISCORD_WEBHOOK_URL") {
        config.discord.webhook_url = url;
    }

    // Slack
    if let Some(token) = prefixed("SLACK_BOT_TOKEN") {
        config.slack.bot_token = token;
    }
    if let Some(secret) = prefixed("SLACK_SIGNING_SECRET") {
        config.slack.signing_secret = secret;
    }
    if let Some(url) = prefixed("SLACK_WEBHOOK_URL") {
        config.slack.webhook_url = url;
    }
    if let Some(channel) = prefixed("SLACK_CHANNEL_ID") {
        config.slack.channel_id = channel;
    }

    if let Some(log_only) = prefixed("LOG_ONLY") {
        config.relay.log_only = matches!(log_only.to_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Some(port) = var("PORT") {
        if let Ok(port) = port.parse() {
            config.slack.port = port;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `FERRYMAN_CONFIG` environment variable, otherwise returns "ferryman.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "ferryman.conf".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            slack: SlackConfig {
                bot_token: "xoxb-original".to_string(),
                signing_secret: "original_secret".to_string(),
                webhook_url: "https://hooks.slack.com/services/T/B/X".to_string(),
                channel_id: "C1".to_string(),
                webhook_channel: "#general".to_string(),
                port: 3000,
                events_path: "/slack/events".to_string(),
                api_base: "https://slack.com/api".to_string(),
            },
            discord: DiscordConfig {
                token: "original_token".to_string(),
                webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
                channel_name: "general".to_string(),
            },
            relay: RelayConfig::default(),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "FERRYMAN");
    }

    #[test]
    fn test_no_vars_leaves_config_unchanged() {
        let result = apply_overrides(make_test_config(), vars(&[]));

        assert_eq!(result.discord.token, "original_token");
        assert_eq!(result.slack.bot_token, "xoxb-original");
        assert_eq!(result.slack.port, 3000);
        assert!(!result.relay.log_only);
    }

    #[test]
    fn test_secret_overrides() {
        let result = apply_overrides(
            make_test_config(),
            vars(&[
                ("FERRYMAN_DISCORD_TOKEN", "env_token"),
                ("FERRYMAN_SLACK_SIGNING_SECRET", "env_secret"),
                ("FERRYMAN_SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/Y"),
            ]),
        );

        assert_eq!(result.discord.token, "env_token");
        assert_eq!(result.slack.signing_secret, "env_secret");
        assert_eq!(result.slack.webhook_url, "https://hooks.slack.com/services/T/B/Y");
        assert_eq!(result.slack.bot_token, "xoxb-original");
    }

    #[test]
    fn test_port_and_log_only() {
        let result = apply_overrides(
            make_test_config(),
            vars(&[("PORT", "8080"), ("FERRYMAN_LOG_ONLY", "TRUE")]),
        );
        assert_eq!(result.slack.port, 8080);
        assert!(result.relay.log_only);
    }

    #[test]
    fn test_invalid_port_ignored() {
        let result = apply_overrides(make_test_config(), vars(&[("PORT", "not-a-port")]));
        assert_eq!(result.slack.port, 3000);
    }
}
