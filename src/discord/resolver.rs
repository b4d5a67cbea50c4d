//! Mention and markup resolution for Discord -> Slack messages.
//!
//! Discord message content carries raw references (`<@123>`, `<#456>`,
//! `<@&789>`, `<:emoji:1011>`) that mean nothing in Slack. They are
//! rewritten to plain text using names from the message and the cache.

use fancy_regex::Regex;
use serenity::cache::Cache;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, RoleId, UserId};

/// Name lookups for the IDs referenced in a message.
pub trait MentionNames {
    /// Display name of a user.
    fn user(&self, id: u64) -> Option<String>;
    /// Name of a channel.
    fn channel(&self, id: u64) -> Option<String>;
    /// Name of a role.
    fn role(&self, id: u64) -> Option<String>;
}

/// Names from the message's own mention list, falling back to the cache.
pub struct MessageNames<'a> {
    cache: &'a Cache,
    message: &'a Message,
}

impl<'a> MessageNames<'a> {
    pub fn new(cache: &'a Cache, message: &'a Message) -> Self {
        Self { cache, message }
    }
}

impl MentionNames for MessageNames<'_> {
    fn user(&self, id: u64) -> Option<String> {
        let user_id = UserId::new(id);

        // Guild nickname first
        if let Some(guild_id) = self.message.guild_id {
            if let Some(guild) = self.cache.guild(guild_id) {
                if let Some(member) = guild.members.get(&user_id) {
                    return Some(member.display_name().to_string());
                }
            }
        }

        if let Some(user) = self.message.mentions.iter().find(|u| u.id == user_id) {
            return Some(user.display_name().to_string());
        }

        self.cache
            .user(user_id)
            .map(|user| user.display_name().to_string())
    }

    fn channel(&self, id: u64) -> Option<String> {
        let channel_id = ChannelId::new(id);
        let guild = self.message.guild_id.and_then(|g| self.cache.guild(g))?;
        let name = guild.channels.get(&channel_id).map(|c| c.name.clone());
        name
    }

    fn role(&self, id: u64) -> Option<String> {
        let role_id = RoleId::new(id);
        let guild = self.message.guild_id.and_then(|g| self.cache.guild(g))?;
        let name = guild.roles.get(&role_id).map(|r| r.name.clone());
        name
    }
}

/// Produces the plain-text ("clean") content of a Discord message.
#[derive(Debug, Clone)]
pub struct ContentCleaner {
    /// Pattern for user mentions (<@123> or <@!123>).
    mention_pattern: Regex,
    /// Pattern for channel mentions (<#123>).
    channel_pattern: Regex,
    /// Pattern for role mentions (<@&123>).
    role_pattern: Regex,
    /// Pattern for custom emojis (<:name:id> or <a:name:id>).
    emoji_pattern: Regex,
    /// Pattern for mass pings.
    everyone_pattern: Regex,
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentCleaner {
    pub fn new() -> Self {
        Self {
            mention_pattern: Regex::new(r"<@!?(\d+)>").unwrap(),
            channel_pattern: Regex::new(r"<#(\d+)>").unwrap(),
            role_pattern: Regex::new(r"<@&(\d+)>").unwrap(),
            emoji_pattern: Regex::new(r"<a?:([a-zA-Z0-9_]+):\d+>").unwrap(),
            everyone_pattern: Regex::new(r"@(everyone|here)").unwrap(),
        }
    }

    /// Convert <@123456789> to @name.
    pub fn resolve_mentions_to_text(&self, message: &str, names: &impl MentionNames) -> String {
        replace_ids(&self.mention_pattern, message, |id| {
            names.user(id).map(|name| format!("@{}", name))
        })
    }

    /// Convert <#123456789> to #channel.
    pub fn resolve_channel_mentions(&self, message: &str, names: &impl MentionNames) -> String {
        replace_ids(&self.channel_pattern, message, |id| {
            names.channel(id).map(|name| format!("#{}", name))
        })
    }

    /// Convert <@&123456789> to @role.
    pub fn resolve_role_mentions(&self, message: &str, names: &impl MentionNames) -> String {
        replace_ids(&self.role_pattern, message, |id| {
            names.role(id).map(|name| format!("@{}", name))
        })
    }

    /// Convert custom emojis to their :shortcode: form.
    pub fn resolve_custom_emojis_to_text(&self, message: &str) -> String {
        self.emoji_pattern.replace_all(message, ":$1:").to_string()
    }

    /// Break @everyone and @here with a zero-width space.
    pub fn defuse_mass_mentions(&self, message: &str) -> String {
        self.everyone_pattern
            .replace_all(message, "@\u{200b}$1")
            .to_string()
    }

    /// Full cleanup of a message's content.
    pub fn clean_content(&self, message: &str, names: &impl MentionNames) -> String {
        let step1 = self.resolve_role_mentions(message, names);
        let step2 = self.resolve_mentions_to_text(&step1, names);
        let step3 = self.resolve_channel_mentions(&step2, names);
        let step4 = self.resolve_custom_emojis_to_text(&step3);
        self.defuse_mass_mentions(&step4)
    }
}

/// Replace every match of `pattern` whose first capture is a non-zero ID
/// that `resolve` knows. Unknown IDs keep their original text.
fn replace_ids(pattern: &Regex, message: &str, resolve: impl Fn(u64) -> Option<String>) -> String {
    pattern
        .replace_all(message, |caps: &fancy_regex::Captures| -> String {
            caps[1]
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .and_then(&resolve)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct StaticNames {
        users: HashMap<u64, String>,
        channels: HashMap<u64, String>,
        roles: HashMap<u64, String>,
    }

    impl MentionNames for StaticNames {
        fn user(&self, id: u64) -> Option<String> {
            self.users.get(&id).cloned()
        }
        fn channel(&self, id: u64) -> Option<String> {
            self.channels.get(&id).cloned()
        }
        fn role(&self, id: u64) -> Option<String> {
            self.roles.get(&id).cloned()
        }
    }

    fn names() -> StaticNames {
        let mut names = StaticNames::default();
        names.users.insert(80351110224678912, "Nelly".to_string());
        names.channels.insert(41771983423143937, "general".to_string());
        names.roles.insert(165511591545143296, "Moderators".to_string());
        names
    }

    #[test]
    fn test_user_mentions_resolved() {
        let cleaner = ContentCleaner::new();
        let output = cleaner.resolve_mentions_to_text(
            "hi <@80351110224678912> and <@!80351110224678912>",
            &names(),
        );
        assert_eq!(output, "hi @Nelly and @Nelly");
    }

    #[test]
    fn test_unknown_ids_kept() {
        let cleaner = ContentCleaner::new();
        let output = cleaner.clean_content("<@1> <#2> <@&3> <@0>", &names());
        assert_eq!(output, "<@1> <#2> <@&3> <@0>");
    }

    #[test]
    fn test_channel_and_role_mentions_resolved() {
        let cleaner = ContentCleaner::new();
        let output = cleaner.clean_content(
            "<@&165511591545143296> see <#41771983423143937>",
            &names(),
        );
        assert_eq!(output, "@Moderators see #general");
    }

    #[test]
    fn test_custom_emojis_to_text() {
        let cleaner = ContentCleaner::new();
        let output =
            cleaner.resolve_custom_emojis_to_text("Hello <:pepega:123456789> world <a:animated:987654321>");
        assert_eq!(output, "Hello :pepega: world :animated:");
    }

    #[test]
    fn test_mass_mentions_defused() {
        let cleaner = ContentCleaner::new();
        let output = cleaner.clean_content("@everyone and @here look", &names());
        assert_eq!(output, "@\u{200b}everyone and @\u{200b}here look");
    }

    #[test]
    fn test_clean_content_plain_text_unchanged() {
        let cleaner = ContentCleaner::new();
        let input = "nothing to see here: a < b && c > d";
        assert_eq!(cleaner.clean_content(input, &names()), input);
    }
}
