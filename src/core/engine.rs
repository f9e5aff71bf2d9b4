use crate::core::message::{build_message, build_title};
use crate::core::ranker::ConcurrentRanker;
use crate::core::{MenuSource, Notifier, NutritionSource, RankedResult};
use crate::utils::error::{LunchError, Result};
use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub menu_items: usize,
    pub result: RankedResult,
    pub title: String,
    pub message: String,
    pub delivered: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

/// Runs one lunch job: menu, ranking, message, notifications.
pub struct LunchEngine<M: MenuSource, S: NutritionSource> {
    menu: M,
    ranker: ConcurrentRanker<S>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl<M: MenuSource, S: NutritionSource> LunchEngine<M, S> {
    pub fn new(menu: M, ranker: ConcurrentRanker<S>) -> Self {
        Self {
            menu,
            ranker,
            notifiers: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_notifiers(mut self, notifiers: Vec<Box<dyn Notifier>>) -> Self {
        self.notifiers.extend(notifiers);
        self
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_on(Local::now().date_naive()).await
    }

    pub async fn run_on(&self, date: NaiveDate) -> Result<RunSummary> {
        tracing::info!("🚀 Starting lunch job");

        let items = self.menu.lunch_items().await?;
        if items.is_empty() {
            return Err(LunchError::EmptyMenu);
        }
        tracing::info!("📋 Found {} lunch items", items.len());

        let result = self.ranker.rank(&items).await;
        tracing::info!("🥗 Found {} healthy meals", result.len());

        let title = build_title(date);
        let message = build_message(&result);

        let mut delivered = Vec::new();
        let mut failed = Vec::new();
        for notifier in &self.notifiers {
            match notifier.send(&title, &message).await {
                Ok(()) => {
                    tracing::info!("📨 Notification sent via {}", notifier.channel());
                    delivered.push(notifier.channel());
                }
                Err(e) => {
                    tracing::error!("❌ {}", e);
                    failed.push(notifier.channel());
                }
            }
        }

        tracing::info!("✅ Job complete");
        Ok(RunSummary {
            menu_items: items.len(),
            result,
            title,
            message,
            delivered,
            failed,
        })
    }
}
