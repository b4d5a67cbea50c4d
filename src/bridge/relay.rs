//! Bidirectional Slack <-> Discord relay.
//!
//! Each inbound event is handled independently. The `relay_*` methods
//! return a `Result` describing what happened; the `on_*` wrappers are
//! the event-handler boundary that logs failures and swallows them, so
//! one bad message never affects other in-flight messages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::bridge::profiles::ProfileCache;
use crate::bridge::translator::ReferenceTranslator;
use crate::common::error::{DeliveryError, RelayError};
use crate::common::{DiscordMessageEvent, NormalizedMessage, SlackMessageEvent, SlackWebhookPayload};
use crate::config::Config;

/// Outbound delivery to Discord.
#[async_trait]
pub trait DiscordSender: Send + Sync {
    /// Post a message to the relay channel as the given identity.
    async fn send(&self, message: &NormalizedMessage) -> Result<(), DeliveryError>;
}

/// Outbound delivery to Slack.
#[async_trait]
pub trait SlackSender: Send + Sync {
    /// Post a payload to the Slack incoming webhook.
    async fn post(&self, payload: &SlackWebhookPayload) -> Result<(), DeliveryError>;
}

/// Why an event was not relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Slack event carries a subtype (edit, join, bot message, ...).
    Subtype,
    /// Slack event has no author.
    NoAuthor,
    /// Message was posted outside the relayed channel.
    OtherChannel,
    /// Discord message was written by a bot.
    BotAuthor,
}

/// What happened to an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Delivered to the other platform.
    Forwarded,
    /// Fully processed, delivery suppressed by log-only mode.
    DryRun,
    /// Ignored before delivery.
    Skipped(SkipReason),
}

/// Relay settings derived from configuration.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Slack channel ID relayed to Discord.
    pub slack_channel_id: String,
    /// Discord channel name relayed to Slack.
    pub discord_channel_name: String,
    /// `channel` field of Slack webhook payloads.
    pub slack_webhook_channel: String,
    /// Resolve and log, but never deliver.
    pub log_only: bool,
    /// Upper bound for each delivery call.
    pub request_timeout: Duration,
}

impl From<&Config> for RelaySettings {
    fn from(config: &Config) -> Self {
        Self {
            slack_channel_id: config.slack.channel_id.clone(),
            discord_channel_name: config.discord.channel_name.clone(),
            slack_webhook_channel: config.slack.webhook_channel.clone(),
            log_only: config.relay.log_only,
            request_timeout: config.relay.request_timeout(),
        }
    }
}

/// The relay between one Slack channel and one Discord channel.
pub struct Relay {
    profiles: Arc<ProfileCache>,
    translator: ReferenceTranslator,
    discord: Arc<dyn DiscordSender>,
    slack: Arc<dyn SlackSender>,
    settings: RelaySettings,
}

impl Relay {
    pub fn new(
        profiles: Arc<ProfileCache>,
        discord: Arc<dyn DiscordSender>,
        slack: Arc<dyn SlackSender>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            translator: ReferenceTranslator::new(Arc::clone(&profiles)),
            profiles,
            discord,
            slack,
            settings,
        }
    }

    /// Handle a Slack message event, logging and discarding any error.
    pub async fn on_slack_message(&self, event: SlackMessageEvent) -> Option<RelayOutcome> {
        let channel = event.channel.clone();
        match self.relay_slack_message(event).await {
            Ok(outcome) => {
                debug!(
                    channel = %channel,
                    ?outcome,
                    cached_profiles = self.profiles.len(),
                    "Slack event handled"
                );
                Some(outcome)
            }
            Err(e) => {
                error!(channel = %channel, "Failed to relay Slack message: {:?}", e);
                None
            }
        }
    }

    /// Handle a Discord message event, logging and discarding any error.
    pub async fn on_discord_message(&self, event: DiscordMessageEvent) -> Option<RelayOutcome> {
        let channel = event.channel_name.clone();
        match self.relay_discord_message(event).await {
            Ok(outcome) => {
                debug!(channel = %channel, ?outcome, "Discord event handled");
                Some(outcome)
            }
            Err(e) => {
                error!(channel = %channel, "Failed to relay Discord message: {:?}", e);
                None
            }
        }
    }

    /// Relay a Slack message to Discord.
    ///
    /// The author is resolved and the text normalized before the channel
    /// check, so messages from other channels still warm the profile cache.
    pub async fn relay_slack_message(
        &self,
        event: SlackMessageEvent,
    ) -> Result<RelayOutcome, RelayError> {
        if event.has_subtype() {
            return Ok(RelayOutcome::Skipped(SkipReason::Subtype));
        }
        let Some(user_id) = event.user.as_deref() else {
            debug!(channel = %event.channel, "Slack message without author");
            return Ok(RelayOutcome::Skipped(SkipReason::NoAuthor));
        };

        let author = self.profiles.get_profile(user_id).await?;
        let text = self.translator.normalize(&event.text).await?;

        info!("Slack - {} @{}: {}", event.channel, author.display_name, text);

        if event.channel != self.settings.slack_channel_id {
            return Ok(RelayOutcome::Skipped(SkipReason::OtherChannel));
        }

        let message = NormalizedMessage {
            text,
            display_name: author.display_name,
            avatar_url: author.avatar_url,
        };

        if self.settings.log_only {
            info!(username = %message.display_name, "Log-only mode, not sending to Discord");
            return Ok(RelayOutcome::DryRun);
        }

        self.with_timeout("discord", self.discord.send(&message)).await?;
        Ok(RelayOutcome::Forwarded)
    }

    /// Relay a Discord message to Slack.
    pub async fn relay_discord_message(
        &self,
        event: DiscordMessageEvent,
    ) -> Result<RelayOutcome, RelayError> {
        if event.author_is_bot {
            return Ok(RelayOutcome::Skipped(SkipReason::BotAuthor));
        }
        if event.channel_name != self.settings.discord_channel_name {
            return Ok(RelayOutcome::Skipped(SkipReason::OtherChannel));
        }

        let payload = SlackWebhookPayload {
            channel: self.settings.slack_webhook_channel.clone(),
            username: event.author_name,
            text: event.clean_content,
            icon_url: event.author_avatar_url,
        };

        info!("Discord - @{}: {}", payload.username, payload.text);

        if self.settings.log_only {
            info!(channel = %payload.channel, "Log-only mode, not sending to Slack");
            return Ok(RelayOutcome::DryRun);
        }

        self.with_timeout("slack", self.slack.post(&payload)).await?;
        Ok(RelayOutcome::Forwarded)
    }

    async fn with_timeout(
        &self,
        target: &'static str,
        delivery: impl std::future::Future<Output = Result<(), DeliveryError>>,
    ) -> Result<(), DeliveryError> {
        tokio::time::timeout(self.settings.request_timeout, delivery)
            .await
            .map_err(|_| DeliveryError::Timeout { target })?
    }
}
