//! Discord integration.
//!
//! Inbound messages arrive over the gateway; outbound messages go through
//! a webhook so they carry the Slack author's name and avatar.

pub mod client;
pub mod handler;
pub mod resolver;
pub mod webhook;

// Re-export main types for external use
pub use client::DiscordBot;
pub use webhook::DiscordWebhook;
