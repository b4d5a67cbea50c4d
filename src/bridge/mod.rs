//! Core relay pipeline between Slack and Discord.
//!
//! ## Module Structure
//!
//! - `profiles`: Slack profile cache (`ProfileCache`, `ProfileLookup`)
//! - `translator`: Slack markup normalization (`ReferenceTranslator`)
//! - `relay`: inbound adapters for both directions (`Relay`)

pub mod profiles;
pub mod relay;
pub mod translator;

pub use profiles::{ProfileCache, ProfileLookup};
pub use relay::{DiscordSender, Relay, RelayOutcome, RelaySettings, SkipReason, SlackSender};
pub use translator::{MentionToken, ReferenceTranslator};
