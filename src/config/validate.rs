//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use reqwest::Url;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Secrets
    check_secret(&mut errors, "discord.token", &config.discord.token, "YOUR_DISCORD_TOKEN_HERE");
    check_secret(&mut errors, "slack.bot_token", &config.slack.bot_token, "YOUR_SLACK_BOT_TOKEN_HERE");
    check_secret(
        &mut errors,
        "slack.signing_secret",
        &config.slack.signing_secret,
        "YOUR_SLACK_SIGNING_SECRET_HERE",
    );

    // Webhooks
    check_url(&mut errors, "discord.webhook_url", &config.discord.webhook_url);
    check_url(&mut errors, "slack.webhook_url", &config.slack.webhook_url);
    check_url(&mut errors, "slack.api_base", &config.slack.api_base);

    // Channels
    if config.slack.channel_id.is_empty() {
        errors.push("slack.channel_id is required".to_string());
    }
    if config.slack.webhook_channel.is_empty() {
        errors.push("slack.webhook_channel must not be empty".to_string());
    }
    if config.discord.channel_name.is_empty() {
        errors.push("discord.channel_name must not be empty".to_string());
    }

    // Events endpoint
    if config.slack.port == 0 {
        errors.push("slack.port must be non-zero".to_string());
    }
    if !config.slack.events_path.starts_with('/') {
        errors.push(format!(
            "slack.events_path '{}' must start with '/'",
            config.slack.events_path
        ));
    }

    if config.relay.request_timeout_secs == 0 {
        errors.push("relay.request_timeout_secs must be non-zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn check_secret(errors: &mut Vec<String>, field: &str, value: &str, placeholder: &str) {
    if value.is_empty() {
        errors.push(format!("{} is required", field));
    } else if value == placeholder {
        errors.push(format!("{} has not been configured (still using placeholder)", field));
    }
}

fn check_url(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{} is required", field));
        return;
    }
    match Url::parse(value) {
        Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {}
        Ok(url) => errors.push(format!("{} has unsupported scheme '{}'", field, url.scheme())),
        Err(e) => errors.push(format!("{} is not a valid URL: {}", field, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        Config {
            slack: SlackConfig {
                bot_token: "xoxb-123".to_string(),
                signing_secret: "8f742231b10e8888abcd99yyyzzz85a5".to_string(),
                webhook_url: "https://hooks.slack.com/services/T/B/X".to_string(),
                channel_id: "C024BE91L".to_string(),
                webhook_channel: "#general".to_string(),
                port: 3000,
                events_path: "/slack/events".to_string(),
                api_base: "https://slack.com/api".to_string(),
            },
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
                channel_name: "general".to_string(),
            },
            relay: RelayConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("discord.token"));
    }

    #[test]
    fn test_placeholder_secret_fails() {
        let mut config = make_valid_config();
        config.slack.signing_secret = "YOUR_SLACK_SIGNING_SECRET_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_invalid_webhook_url_fails() {
        let mut config = make_valid_config();
        config.slack.webhook_url = "not a url".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("slack.webhook_url"));
        assert!(message.contains("not a valid URL"));
    }

    #[test]
    fn test_non_http_scheme_fails() {
        let mut config = make_valid_config();
        config.discord.webhook_url = "ftp://discord.com/api/webhooks/1/abc".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("unsupported scheme"));
    }

    #[test]
    fn test_events_path_without_slash_fails() {
        let mut config = make_valid_config();
        config.slack.events_path = "slack/events".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("events_path"));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = make_valid_config();
        config.slack.channel_id = String::new();
        config.slack.port = 0;
        config.relay.request_timeout_secs = 0;

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("slack.channel_id"));
        assert!(message.contains("slack.port"));
        assert!(message.contains("request_timeout_secs"));
    }
}
