//! Discord message event handling.
//!
//! Turns gateway messages into [`DiscordMessageEvent`]s and hands them to
//! the relay.

use std::sync::Arc;

use serenity::model::channel::{Channel, Message};
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::{debug, info, warn};

use crate::bridge::Relay;
use crate::common::DiscordMessageEvent;
use crate::discord::resolver::{ContentCleaner, MentionNames, MessageNames};

/// Discord event handler feeding the Discord -> Slack direction.
pub struct RelayHandler {
    relay: Arc<Relay>,
    cleaner: ContentCleaner,
}

impl RelayHandler {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self {
            relay,
            cleaner: ContentCleaner::new(),
        }
    }

    pub fn handle_ready(&self, ready: &Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        info!("Watching {} guild(s)", ready.guilds.len());
    }

    pub async fn handle_message(&self, ctx: &Context, msg: Message) {
        let channel_name = channel_name(ctx, msg.channel_id).await.unwrap_or_default();
        let event = {
            let names = MessageNames::new(&ctx.cache, &msg);
            build_event(&self.cleaner, &msg, &names, channel_name)
        };

        let relay = Arc::clone(&self.relay);
        tokio::spawn(async move {
            relay.on_discord_message(event).await;
        });
    }
}

/// Build the relay's view of a Discord message.
pub fn build_event(
    cleaner: &ContentCleaner,
    msg: &Message,
    names: &impl MentionNames,
    channel_name: String,
) -> DiscordMessageEvent {
    let mut clean_content = cleaner.clean_content(&msg.content, names);

    // Attachments only exist as URLs on the Slack side
    for attachment in &msg.attachments {
        if !clean_content.is_empty() {
            clean_content.push(' ');
        }
        clean_content.push_str(&attachment.url);
    }

    DiscordMessageEvent {
        author_name: msg.author.name.clone(),
        author_avatar_url: msg.author.avatar_url(),
        author_is_bot: msg.author.bot,
        channel_name,
        clean_content,
    }
}

/// Name of a guild channel, from the cache when possible.
async fn channel_name(ctx: &Context, channel_id: ChannelId) -> Option<String> {
    if let Some(name) = ctx.cache.channel(channel_id).map(|c| c.name.clone()) {
        return Some(name);
    }

    match channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => Some(channel.name),
        Ok(_) => {
            debug!("Message in non-guild channel {}", channel_id);
            None
        }
        Err(e) => {
            warn!("Failed to resolve Discord channel {}: {}", channel_id, e);
            None
        }
    }
}
