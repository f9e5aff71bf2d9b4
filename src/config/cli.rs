use crate::config::{
    assemble_email_settings, parse_recipients, EmailSettings, NotifyMethod, RankingConfig,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAILERSEND_URL, DEFAULT_MAX_CALORIES,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MENU_URL, DEFAULT_MIN_PROTEIN_GRAMS, DEFAULT_NUTRITION_URL,
    DEFAULT_TOP_N,
};
use crate::core::filter::DietaryThresholds;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "healthy-lunch")]
#[command(about = "Ranks today's cafe lunch menu by protein and portion size per calorie")]
pub struct CliConfig {
    #[arg(long, env = "MENU_URL", default_value = DEFAULT_MENU_URL)]
    pub menu_url: String,

    #[arg(long, env = "NUTRITION_URL", default_value = DEFAULT_NUTRITION_URL)]
    pub nutrition_url: String,

    #[arg(long, env = "MAX_CALORIES", default_value_t = DEFAULT_MAX_CALORIES)]
    pub max_calories: u32,

    #[arg(long, env = "MIN_GRAMS_PROTEIN", default_value_t = DEFAULT_MIN_PROTEIN_GRAMS)]
    pub min_protein_grams: u32,

    #[arg(long, env = "MAX_WORKERS", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    #[arg(long, env = "TOP_N", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    #[arg(long, env = "FETCH_TIMEOUT_SECONDS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_seconds: u64,

    #[arg(
        long,
        env = "NOTIFY_METHODS",
        value_enum,
        value_delimiter = ',',
        default_value = "email,slack"
    )]
    pub notify_methods: Vec<NotifyMethod>,

    #[arg(long, env = "MAILERSEND_API_KEY", hide_env_values = true)]
    pub mailersend_api_key: Option<String>,

    #[arg(long, env = "MAILERSEND_API_URL", default_value = DEFAULT_MAILERSEND_URL)]
    pub mailersend_api_url: String,

    #[arg(long, env = "FROM_EMAIL")]
    pub from_email: Option<String>,

    #[arg(long, env = "FROM_NAME")]
    pub from_name: Option<String>,

    /// JSON array, e.g. [{"name":"John Doe","email":"johndoe@example.com"}]
    #[arg(long, env = "EMAIL_RECIPIENTS")]
    pub email_recipients: Option<String>,

    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Read settings from a TOML file instead of flags and environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Print the notification instead of sending it")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn menu_url(&self) -> &str {
        &self.menu_url
    }

    fn nutrition_endpoint(&self) -> &str {
        &self.nutrition_url
    }

    fn ranking(&self) -> RankingConfig {
        RankingConfig {
            thresholds: DietaryThresholds {
                max_calories: self.max_calories,
                min_protein_grams: self.min_protein_grams,
            },
            max_concurrency: self.max_concurrency,
            top_n: self.top_n,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_seconds),
        }
    }

    fn notify_methods(&self) -> &[NotifyMethod] {
        &self.notify_methods
    }

    fn slack_webhook_url(&self) -> Option<&str> {
        self.slack_webhook_url.as_deref().filter(|url| !url.is_empty())
    }

    fn email_settings(&self) -> Result<Option<EmailSettings>> {
        let recipients = match self.email_recipients.as_deref() {
            Some(json) if !json.trim().is_empty() => Some(parse_recipients(json)?),
            _ => None,
        };
        Ok(assemble_email_settings(
            &self.mailersend_api_url,
            self.mailersend_api_key.as_deref().filter(|key| !key.is_empty()),
            self.from_email.as_deref().filter(|from| !from.is_empty()),
            self.from_name.as_deref(),
            recipients,
        ))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("menu_url", &self.menu_url)?;
        validate_url("nutrition_url", &self.nutrition_url)?;
        self.ranking().validate()?;
        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["healthy-lunch"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--max-calories",
            "700",
            "--min-protein-grams",
            "30",
            "--max-concurrency",
            "4",
            "--top-n",
            "3",
            "--notify-methods",
            "slack",
            "--slack-webhook-url",
            "https://hooks.slack.com/triggers/x",
        ]);

        let ranking = config.ranking();
        assert_eq!(ranking.thresholds.max_calories, 700);
        assert_eq!(ranking.thresholds.min_protein_grams, 30);
        assert_eq!(ranking.max_concurrency, 4);
        assert_eq!(ranking.top_n, 3);
        assert_eq!(config.notify_methods(), &[NotifyMethod::Slack]);
        assert_eq!(
            config.slack_webhook_url(),
            Some("https://hooks.slack.com/triggers/x")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_email_settings_from_flags() {
        let config = parse(&[
            "--mailersend-api-key",
            "mlsn.abc",
            "--from-email",
            "lunch@example.com",
            "--email-recipients",
            r#"[{"name":"John Doe","email":"johndoe@example.com"}]"#,
        ]);

        let settings = config.email_settings().unwrap().unwrap();
        assert_eq!(settings.api_key, "mlsn.abc");
        assert_eq!(settings.recipients.len(), 1);
        assert_eq!(settings.api_url, DEFAULT_MAILERSEND_URL);
    }

    #[test]
    fn test_malformed_recipients_are_an_error() {
        let config = parse(&[
            "--mailersend-api-key",
            "mlsn.abc",
            "--from-email",
            "lunch@example.com",
            "--email-recipients",
            "johndoe@example.com",
        ]);

        assert!(config.email_settings().is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = parse(&["--top-n", "0"]);
        assert!(config.validate().is_err());

        let config = parse(&["--menu-url", "not a url"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_notify_method_is_rejected() {
        let result = CliConfig::try_parse_from(["healthy-lunch", "--notify-methods", "pager"]);
        assert!(result.is_err());
    }
}
