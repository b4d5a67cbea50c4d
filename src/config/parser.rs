//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let config = load_config_str(
            r#"
            slack {
                bot_token = "xoxb-1"
                signing_secret = "secret"
                webhook_url = "https://hooks.slack.com/services/T/B/X"
                channel_id = "C024BE91L"
            }
            discord {
                token = "discord-token"
                webhook_url = "https://discord.com/api/webhooks/1/abc"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.slack.channel_id, "C024BE91L");
        assert_eq!(config.slack.webhook_channel, "#general");
        assert_eq!(config.slack.port, 3000);
        assert_eq!(config.slack.events_path, "/slack/events");
        assert_eq!(config.discord.channel_name, "general");
        assert!(!config.relay.log_only);
        assert_eq!(config.relay.request_timeout_secs, 15);
    }

    #[test]
    fn test_load_relay_section() {
        let config = load_config_str(
            r#"
            slack {
                bot_token = "xoxb-1"
                signing_secret = "secret"
                webhook_url = "https://hooks.slack.com/services/T/B/X"
                channel_id = "C024BE91L"
                port = 8080
            }
            discord {
                token = "discord-token"
                webhook_url = "https://discord.com/api/webhooks/1/abc"
                channel_name = "lobby"
            }
            relay {
                log_only = true
                request_timeout_secs = 5
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.slack.port, 8080);
        assert_eq!(config.discord.channel_name, "lobby");
        assert!(config.relay.log_only);
        assert_eq!(config.relay.request_timeout().as_secs(), 5);
    }

    #[test]
    fn test_missing_section_fails() {
        let result = load_config_str(r#"discord { token = "x", webhook_url = "y" }"#);
        assert!(result.is_err());
    }
}
