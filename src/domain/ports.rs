use crate::config::{EmailSettings, NotifyMethod, RankingConfig};
use crate::domain::model::{MenuItem, RawNutritionPayload};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Produces today's lunch items.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn lunch_items(&self) -> Result<Vec<MenuItem>>;
}

/// Looks up the nutrition payload for a single menu item.
///
/// Implementations are shared across the ranker's workers and must not hold
/// per-call mutable state.
#[async_trait]
pub trait NutritionSource: Send + Sync + 'static {
    async fn fetch(&self, id: &str, nonce: &str) -> Result<RawNutritionPayload>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
    async fn send(&self, title: &str, message: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn menu_url(&self) -> &str;
    fn nutrition_endpoint(&self) -> &str;
    fn ranking(&self) -> RankingConfig;
    fn notify_methods(&self) -> &[NotifyMethod];
    fn slack_webhook_url(&self) -> Option<&str>;
    /// `Ok(None)` when email is not configured at all.
    fn email_settings(&self) -> Result<Option<EmailSettings>>;
}
