#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::filter::DietaryThresholds;
use crate::utils::error::{LunchError, Result};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MENU_URL: &str = "https://paloaltonetworks.cafebonappetit.com/#lunch";
pub const DEFAULT_NUTRITION_URL: &str =
    "https://paloaltonetworks.cafebonappetit.com/wp-admin/admin-ajax.php";
pub const DEFAULT_MAILERSEND_URL: &str = "https://api.mailersend.com/v1/email";
pub const DEFAULT_FROM_NAME: &str = "Healthy Lunch";

pub const DEFAULT_MAX_CALORIES: u32 = 850;
pub const DEFAULT_MIN_PROTEIN_GRAMS: u32 = 25;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Everything the ranking pipeline needs for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    pub thresholds: DietaryThresholds,
    pub max_concurrency: usize,
    pub top_n: usize,
    pub fetch_timeout: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            thresholds: DietaryThresholds {
                max_calories: DEFAULT_MAX_CALORIES,
                min_protein_grams: DEFAULT_MIN_PROTEIN_GRAMS,
            },
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            top_n: DEFAULT_TOP_N,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Validate for RankingConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("max_calories", self.thresholds.max_calories, 1)?;
        validate_range(
            "max_concurrency",
            self.max_concurrency,
            1,
            MAX_CONCURRENCY_LIMIT,
        )?;
        validate_positive_number("top_n", self.top_n, 1)?;
        validate_positive_number("fetch_timeout_seconds", self.fetch_timeout.as_secs(), 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum NotifyMethod {
    Email,
    Slack,
}

impl NotifyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyMethod::Email => "email",
            NotifyMethod::Slack => "slack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub recipients: Vec<Recipient>,
}

impl Validate for EmailSettings {
    fn validate(&self) -> Result<()> {
        validate_url("email.api_url", &self.api_url)?;
        validate_non_empty_string("email.api_key", &self.api_key)?;
        validate_email("email.from_email", &self.from_email)?;
        if self.recipients.is_empty() {
            return Err(LunchError::ConfigValidationError {
                field: "email.recipients".to_string(),
                message: "At least one recipient is required".to_string(),
            });
        }
        for recipient in &self.recipients {
            validate_email("email.recipients", &recipient.email)?;
        }
        Ok(())
    }
}

/// Parses the `EMAIL_RECIPIENTS` format: a JSON array of `{"name", "email"}`.
pub fn parse_recipients(json: &str) -> Result<Vec<Recipient>> {
    serde_json::from_str(json).map_err(|e| LunchError::ConfigValidationError {
        field: "email_recipients".to_string(),
        message: format!("Expected a JSON array of {{\"name\", \"email\"}} objects: {}", e),
    })
}

/// Email is only usable when key, sender and recipients are all present.
pub(crate) fn assemble_email_settings(
    api_url: &str,
    api_key: Option<&str>,
    from_email: Option<&str>,
    from_name: Option<&str>,
    recipients: Option<Vec<Recipient>>,
) -> Option<EmailSettings> {
    match (api_key, from_email, recipients) {
        (Some(api_key), Some(from_email), Some(recipients)) if !recipients.is_empty() => {
            Some(EmailSettings {
                api_url: api_url.to_string(),
                api_key: api_key.to_string(),
                from_email: from_email.to_string(),
                from_name: from_name.unwrap_or(DEFAULT_FROM_NAME).to_string(),
                recipients,
            })
        }
        _ => None,
    }
}
