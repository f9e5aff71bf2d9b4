use crate::core::Notifier;
use crate::utils::error::{LunchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    text: &'a str,
}

/// Posts the message to a Slack workflow webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn channel(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, title: &str, message: &str) -> Result<()> {
        let failure = |message: String| LunchError::NotificationError {
            channel: self.channel().to_string(),
            message,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload {
                title,
                text: message,
            })
            .timeout(WEBHOOK_TIMEOUT)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("webhook returned HTTP status {}", status)));
        }

        tracing::debug!("Slack webhook triggered");
        Ok(())
    }
}
