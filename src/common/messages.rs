//! Canonical message types for relay communication.
//!
//! Everything here is transient: built per inbound event and dropped once
//! the event has been relayed (or skipped).

use serde::Serialize;

/// A Slack user's identity as shown on the Discord side.
///
/// Immutable once fetched; owned by the profile cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Slack user ID (e.g. `U024BE7LH`).
    pub id: String,
    /// Normalized display name.
    pub display_name: String,
    /// Avatar URL (192px variant).
    pub avatar_url: String,
}

/// A Slack message ready to be posted to Discord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Plain text with mentions, channel references and entities resolved.
    pub text: String,
    /// Name the Discord webhook posts as.
    pub display_name: String,
    /// Avatar the Discord webhook posts with.
    pub avatar_url: String,
}

/// Message event received from the Slack Events API.
#[derive(Debug, Clone, Default)]
pub struct SlackMessageEvent {
    /// Subtype marker (`message_changed`, `channel_join`, ...). Plain user
    /// messages carry none.
    pub subtype: Option<String>,
    /// Author's Slack user ID.
    pub user: Option<String>,
    /// Slack channel ID the message was posted in.
    pub channel: String,
    /// Raw message text in Slack markup.
    pub text: String,
}

impl SlackMessageEvent {
    /// Returns true if the event carries a non-empty subtype.
    pub fn has_subtype(&self) -> bool {
        self.subtype.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Message received from the Discord gateway, already flattened.
#[derive(Debug, Clone, Default)]
pub struct DiscordMessageEvent {
    /// Author's username.
    pub author_name: String,
    /// Author's avatar URL, if they have one.
    pub author_avatar_url: Option<String>,
    /// Whether the author is a bot account.
    pub author_is_bot: bool,
    /// Name of the channel the message was posted in.
    pub channel_name: String,
    /// Message content with mentions and markup resolved to plain text.
    pub clean_content: String,
}

/// JSON body posted to a Slack incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackWebhookPayload {
    pub channel: String,
    pub username: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}
