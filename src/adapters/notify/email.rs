use crate::config::{EmailSettings, Recipient};
use crate::core::Notifier;
use crate::utils::error::{LunchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const EMAIL_API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct Sender<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: Sender<'a>,
    to: &'a [Recipient],
    subject: &'a str,
    text: &'a str,
}

/// Sends a plain-text email through the MailerSend HTTP API.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    client: Client,
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(client: Client, settings: EmailSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send(&self, title: &str, message: &str) -> Result<()> {
        let failure = |message: String| LunchError::NotificationError {
            channel: self.channel().to_string(),
            message,
        };

        let request = EmailRequest {
            from: Sender {
                email: &self.settings.from_email,
                name: &self.settings.from_name,
            },
            to: &self.settings.recipients,
            subject: title,
            text: message,
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .timeout(EMAIL_API_TIMEOUT)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("email API returned HTTP status {}: {}", status, body)));
        }

        tracing::debug!(
            "Email sent to {} recipient(s)",
            self.settings.recipients.len()
        );
        Ok(())
    }
}
