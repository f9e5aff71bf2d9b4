use thiserror::Error;

#[derive(Error, Debug)]
pub enum LunchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Nutrition fetch failed for item {id}: {cause}")]
    FetchError { id: String, cause: String },

    #[error("Nutrition normalization failed for item {id}: {message}")]
    NormalizationError { id: String, message: String },

    #[error("Menu parsing error: {message}")]
    MenuParseError { message: String },

    #[error("No lunch items found on the menu")]
    EmptyMenu,

    #[error("Notification via {channel} failed: {message}")]
    NotificationError { channel: String, message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Menu,
    Notification,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LunchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LunchError::ApiError(_) | LunchError::FetchError { .. } => ErrorCategory::Network,
            LunchError::SerializationError(_) | LunchError::NormalizationError { .. } => {
                ErrorCategory::Data
            }
            LunchError::MenuParseError { .. } | LunchError::EmptyMenu => ErrorCategory::Menu,
            LunchError::NotificationError { .. } => ErrorCategory::Notification,
            LunchError::ConfigValidationError { .. }
            | LunchError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LunchError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Notification => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Menu => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LunchError::ApiError(_) | LunchError::FetchError { .. } => {
                "Check network connectivity and that the cafe site is reachable"
            }
            LunchError::EmptyMenu => {
                "The cafe may be closed today, or the lunch tab has not been published yet"
            }
            LunchError::MenuParseError { .. } => {
                "The menu page layout may have changed; verify MENU_URL"
            }
            LunchError::SerializationError(_) | LunchError::NormalizationError { .. } => {
                "The nutrition endpoint returned unexpected data; verify NUTRITION_URL"
            }
            LunchError::NotificationError { .. } => {
                "Verify the webhook URL or email API key and recipients"
            }
            LunchError::ConfigValidationError { .. }
            | LunchError::InvalidConfigValueError { .. } => {
                "Review command line flags, environment variables and the config file"
            }
            LunchError::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LunchError::EmptyMenu => "No lunch items were published today".to_string(),
            LunchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LunchError>;
