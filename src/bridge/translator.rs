//! Slack markup to plain text translation.
//!
//! Slack delivers message text with embedded references:
//! - channel references: `<#C024BE91L|general>`
//! - user mentions: `<@U024BE7LH>`
//! - HTML entities for `<`, `>` and `&`
//!
//! Discord users can't resolve any of these, so they are rewritten to
//! `#general`, `@Display Name` and literal characters before relaying.
//!
//! Token matching is done by a hand-written scanner with the following
//! grammar (the "body" is the shortest run of one or more characters that
//! are not line terminators):
//! - channel: `<#` body `|` name `>` where name is `[a-z0-9_-]+`
//! - user: `<@` body `>`

use std::ops::Range;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::bridge::profiles::ProfileCache;
use crate::common::error::LookupError;

/// A user mention found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken {
    /// Byte range of the whole token in the scanned text.
    pub span: Range<usize>,
    /// The token as it appears in the text (`<@U123>`).
    pub raw: String,
    /// Captured user ID (`U123`).
    pub user_id: String,
}

/// Rewrites Slack references into text Discord users can read.
pub struct ReferenceTranslator {
    profiles: Arc<ProfileCache>,
}

impl ReferenceTranslator {
    pub fn new(profiles: Arc<ProfileCache>) -> Self {
        Self { profiles }
    }

    /// Normalize raw Slack message text.
    ///
    /// Channel references are replaced first, then every user mention is
    /// resolved through the profile cache (concurrently), then entities are
    /// unescaped.
    ///
    /// Each resolved mention replaces *every* occurrence of its raw token
    /// text, so a token that appears twice is rewritten with the first
    /// resolution's name.
    pub async fn normalize(&self, text: &str) -> Result<String, LookupError> {
        let mut clean = replace_channel_refs(text);

        let mentions = scan_user_mentions(&clean);
        if !mentions.is_empty() {
            debug!(count = mentions.len(), "Resolving Slack user mentions");
        }

        let profiles = try_join_all(
            mentions
                .iter()
                .map(|mention| self.profiles.get_profile(&mention.user_id)),
        )
        .await?;

        for (mention, profile) in mentions.iter().zip(&profiles) {
            clean = clean.replace(&mention.raw, &format!("@{}", profile.display_name));
        }

        Ok(unescape_entities(&clean))
    }
}

/// Replace every `<#id|name>` channel reference with `#name`.
pub fn replace_channel_refs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find("<#") {
        let start = pos + found;
        match match_channel_ref(text, start) {
            Some((end, name)) => {
                out.push_str(&text[pos..start]);
                out.push('#');
                out.push_str(&text[name]);
                pos = end;
            }
            None => {
                out.push_str(&text[pos..=start]);
                pos = start + 1;
            }
        }
    }

    out.push_str(&text[pos..]);
    out
}

/// Collect every `<@id>` user mention, in order of appearance.
///
/// Duplicates are kept.
pub fn scan_user_mentions(text: &str) -> Vec<MentionToken> {
    let mut mentions = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find("<@") {
        let start = pos + found;
        match match_user_mention(text, start) {
            Some((end, id)) => {
                mentions.push(MentionToken {
                    span: start..end,
                    raw: text[start..end].to_string(),
                    user_id: text[id].to_string(),
                });
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    mentions
}

/// Unescape the three entities Slack escapes: `&gt;`, `&lt;`, `&amp;`.
///
/// Applied in that order, so `&amp;lt;` becomes `&lt;`.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_channel_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Match a channel reference at `start` (which must point at `<#`).
///
/// Returns the end of the token and the range of the channel name.
fn match_channel_ref(text: &str, start: usize) -> Option<(usize, Range<usize>)> {
    let body = start + 2;
    let mut chars = text[body..].char_indices();

    let (_, first) = chars.next()?;
    if is_line_terminator(first) {
        return None;
    }

    for (offset, c) in chars {
        let pos = body + offset;
        if c == '|' {
            if let Some(end) = match_channel_name(text, pos + 1) {
                return Some((end, pos + 1..end - 1));
            }
        }
        if is_line_terminator(c) {
            return None;
        }
    }

    None
}

/// Match `[a-z0-9_-]+>` at `from`, returning the position after `>`.
fn match_channel_name(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let len = rest
        .find(|c: char| !is_channel_name_char(c))
        .unwrap_or(rest.len());
    if len == 0 || !rest[len..].starts_with('>') {
        return None;
    }
    Some(from + len + 1)
}

/// Match a user mention at `start` (which must point at `<@`).
///
/// Returns the end of the token and the range of the user ID.
fn match_user_mention(text: &str, start: usize) -> Option<(usize, Range<usize>)> {
    let body = start + 2;
    let mut chars = text[body..].char_indices();

    let (_, first) = chars.next()?;
    if is_line_terminator(first) {
        return None;
    }

    for (offset, c) in chars {
        let pos = body + offset;
        if c == '>' {
            return Some((pos + 1, body..pos));
        }
        if is_line_terminator(c) {
            return None;
        }
    }

    None
}
