pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::toml_config::TomlConfig;
pub use config::RankingConfig;

pub use adapters::{EmailNotifier, MenuScraper, SlackNotifier};
pub use core::{
    engine::{LunchEngine, RunSummary},
    fetcher::NutritionFetcher,
    ranker::ConcurrentRanker,
};
pub use domain::model::{MenuItem, NutritionRecord, RankedResult};
pub use utils::error::{LunchError, Result};
