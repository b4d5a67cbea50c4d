//! Slack integration.
//!
//! Inbound events arrive on a signed HTTP endpoint; profiles come from the
//! Web API; outbound messages go through an incoming webhook.

pub mod api;
pub mod events;
pub mod signature;
pub mod webhook;

pub use api::SlackProfileApi;
pub use signature::SlackVerifier;
pub use webhook::SlackWebhook;
