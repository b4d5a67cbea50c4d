//! Common types shared across the application.

pub mod error;
pub mod http;
pub mod messages;
pub mod shutdown;

pub use error::{DeliveryError, LookupError, RelayError};
pub use http::http_client;
pub use messages::{
    DiscordMessageEvent, NormalizedMessage, SlackMessageEvent, SlackWebhookPayload, UserProfile,
};
pub use shutdown::wait_for_shutdown;
