//! Slack incoming webhook delivery.

use async_trait::async_trait;
use tracing::debug;

use crate::bridge::SlackSender;
use crate::common::error::DeliveryError;
use crate::common::SlackWebhookPayload;

/// Posts Discord messages into Slack through an incoming webhook.
pub struct SlackWebhook {
    client: reqwest::Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SlackSender for SlackWebhook {
    async fn post(&self, payload: &SlackWebhookPayload) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        debug!(username = %payload.username, "Posted to Slack webhook");
        Ok(())
    }
}
