//! Slack Web API profile lookup.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::bridge::ProfileLookup;
use crate::common::error::LookupError;
use crate::common::UserProfile;

/// Response of `users.profile.get`.
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    ok: bool,
    error: Option<String>,
    profile: Option<SlackProfile>,
}

#[derive(Debug, Deserialize)]
struct SlackProfile {
    #[serde(default)]
    display_name_normalized: String,
    #[serde(default)]
    image_192: String,
}

/// Looks up user profiles with the bot token.
pub struct SlackProfileApi {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl SlackProfileApi {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ProfileLookup for SlackProfileApi {
    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, LookupError> {
        let network = |source| LookupError::Network {
            user_id: user_id.to_string(),
            source,
        };

        debug!(user_id, "Fetching Slack profile");
        let response: ProfileResponse = self
            .client
            .get(format!("{}/users.profile.get", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("user", user_id)])
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)?;

        into_profile(user_id, response)
    }
}

fn into_profile(user_id: &str, response: ProfileResponse) -> Result<UserProfile, LookupError> {
    let api_error = |error: String| LookupError::Api {
        user_id: user_id.to_string(),
        error,
    };

    if !response.ok {
        return Err(api_error(
            response.error.unwrap_or_else(|| "unknown_error".to_string()),
        ));
    }
    let profile = response
        .profile
        .ok_or_else(|| api_error("missing_profile".to_string()))?;

    Ok(UserProfile {
        id: user_id.to_string(),
        display_name: profile.display_name_normalized,
        avatar_url: profile.image_192,
    })
}
