//! Discord webhook delivery for Slack -> Discord messages.

use async_trait::async_trait;
use serenity::builder::{CreateAllowedMentions, ExecuteWebhook};
use serenity::http::Http;
use serenity::model::webhook::Webhook;
use tracing::info;

use crate::bridge::DiscordSender;
use crate::common::error::DeliveryError;
use crate::common::NormalizedMessage;

/// Posts messages through a Discord webhook, impersonating the Slack author.
pub struct DiscordWebhook {
    http: Http,
    webhook: Webhook,
}

impl DiscordWebhook {
    /// Resolve the webhook behind `url`. Webhook URLs carry their own token,
    /// so no bot token is needed.
    pub async fn connect(url: &str) -> Result<Self, DeliveryError> {
        let http = Http::new("");
        let webhook = Webhook::from_url(&http, url).await?;
        info!(
            "Discord webhook resolved: {}",
            webhook.name.as_deref().unwrap_or("unnamed")
        );
        Ok(Self { http, webhook })
    }
}

fn build_execute(message: &NormalizedMessage) -> ExecuteWebhook {
    let mut builder = ExecuteWebhook::new()
        .content(message.text.as_str())
        .username(message.display_name.as_str())
        // Slack text must never ping Discord users or roles
        .allowed_mentions(CreateAllowedMentions::new());
    if !message.avatar_url.is_empty() {
        builder = builder.avatar_url(message.avatar_url.as_str());
    }
    builder
}

#[async_trait]
impl DiscordSender for DiscordWebhook {
    async fn send(&self, message: &NormalizedMessage) -> Result<(), DeliveryError> {
        self.webhook
            .execute(&self.http, false, build_execute(message))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(avatar_url: &str) -> NormalizedMessage {
        NormalizedMessage {
            text: "hello #general".to_string(),
            display_name: "Ada".to_string(),
            avatar_url: avatar_url.to_string(),
        }
    }

    #[test]
    fn test_execute_impersonates_author() {
        let body =
            serde_json::to_value(build_execute(&message("https://a.example/ada.png"))).unwrap();
        assert_eq!(body["content"], "hello #general");
        assert_eq!(body["username"], "Ada");
        assert_eq!(body["avatar_url"], "https://a.example/ada.png");
        assert!(body["allowed_mentions"].is_object());
    }

    #[test]
    fn test_empty_avatar_omitted() {
        let body = serde_json::to_value(build_execute(&message(""))).unwrap();
        assert!(body.get("avatar_url").map_or(true, |v| v.is_null()));
    }
}
