pub mod email;
pub mod slack;

pub use email::EmailNotifier;
pub use slack::SlackNotifier;

use crate::config::NotifyMethod;
use crate::core::{ConfigProvider, Notifier};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::Client;

/// Prints the notification instead of sending it (`--dry-run`).
#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    fn channel(&self) -> &'static str {
        "stdout"
    }

    async fn send(&self, title: &str, message: &str) -> Result<()> {
        println!("{}\n\n{}", title, message);
        Ok(())
    }
}

/// One notifier per configured method. Methods without settings are skipped
/// with a warning; invalid settings are an error.
pub fn build_notifiers<C: ConfigProvider + ?Sized>(
    config: &C,
    client: &Client,
) -> Result<Vec<Box<dyn Notifier>>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    for method in config.notify_methods() {
        match method {
            NotifyMethod::Slack => match config.slack_webhook_url() {
                Some(url) => {
                    crate::utils::validation::validate_url("slack_webhook_url", url)?;
                    notifiers.push(Box::new(SlackNotifier::new(client.clone(), url)));
                }
                None => tracing::warn!(
                    "Unable to trigger slack webhook, SLACK_WEBHOOK_URL missing"
                ),
            },
            NotifyMethod::Email => match config.email_settings()? {
                Some(settings) => {
                    settings.validate()?;
                    notifiers.push(Box::new(EmailNotifier::new(client.clone(), settings)));
                }
                None => tracing::warn!(
                    "Unable to send email, at least one of MAILERSEND_API_KEY, EMAIL_RECIPIENTS, FROM_EMAIL missing"
                ),
            },
        }
    }

    Ok(notifiers)
}
