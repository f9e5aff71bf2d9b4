use crate::config::{
    assemble_email_settings, EmailSettings, NotifyMethod, RankingConfig, Recipient,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAILERSEND_URL, DEFAULT_MAX_CALORIES,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MENU_URL, DEFAULT_MIN_PROTEIN_GRAMS, DEFAULT_NUTRITION_URL,
    DEFAULT_TOP_N,
};
use crate::core::filter::DietaryThresholds;
use crate::core::ConfigProvider;
use crate::utils::error::{LunchError, Result};
use crate::utils::validation::{validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub menu: MenuConfig,
    pub nutrition: NutritionConfig,
    pub dietary: DietaryConfig,
    pub ranking: RankConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub url: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MENU_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub max_concurrency: usize,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NUTRITION_URL.to_string(),
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryConfig {
    pub max_calories: u32,
    pub min_protein_grams: u32,
}

impl Default for DietaryConfig {
    fn default() -> Self {
        Self {
            max_calories: DEFAULT_MAX_CALORIES,
            min_protein_grams: DEFAULT_MIN_PROTEIN_GRAMS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub top_n: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub methods: Vec<NotifyMethod>,
    pub slack: Option<SlackConfig>,
    pub email: Option<EmailConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            methods: vec![NotifyMethod::Email, NotifyMethod::Slack],
            slack: None,
            email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

fn env_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Empty strings and `${VAR}` placeholders whose variable was not set count as
/// missing.
fn configured(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty() && !env_var_re().is_match(v))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LunchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LunchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SLACK_WEBHOOK_URL})
    fn substitute_env_vars(content: &str) -> String {
        env_var_re()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for TomlConfig {
    fn menu_url(&self) -> &str {
        &self.menu.url
    }

    fn nutrition_endpoint(&self) -> &str {
        &self.nutrition.endpoint
    }

    fn ranking(&self) -> RankingConfig {
        RankingConfig {
            thresholds: DietaryThresholds {
                max_calories: self.dietary.max_calories,
                min_protein_grams: self.dietary.min_protein_grams,
            },
            max_concurrency: self.nutrition.max_concurrency,
            top_n: self.ranking.top_n,
            fetch_timeout: Duration::from_secs(self.nutrition.timeout_seconds),
        }
    }

    fn notify_methods(&self) -> &[NotifyMethod] {
        &self.notify.methods
    }

    fn slack_webhook_url(&self) -> Option<&str> {
        configured(
            self.notify
                .slack
                .as_ref()
                .and_then(|slack| slack.webhook_url.as_deref()),
        )
    }

    fn email_settings(&self) -> Result<Option<EmailSettings>> {
        let Some(email) = &self.notify.email else {
            return Ok(None);
        };
        Ok(assemble_email_settings(
            configured(email.api_url.as_deref()).unwrap_or(DEFAULT_MAILERSEND_URL),
            configured(email.api_key.as_deref()),
            configured(email.from_email.as_deref()),
            configured(email.from_name.as_deref()),
            Some(email.recipients.clone()),
        ))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("menu.url", &self.menu.url)?;
        validate_url("nutrition.endpoint", &self.nutrition.endpoint)?;
        self.ranking().validate()?;
        Ok(())
    }
}
