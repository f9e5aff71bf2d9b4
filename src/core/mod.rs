pub mod engine;
pub mod fetcher;
pub mod filter;
pub mod message;
pub mod normalizer;
pub mod ranker;
pub mod scorer;

pub use crate::domain::model::{
    MenuItem, NutritionRecord, RankStats, RankedPick, RankedResult, RawNutritionPayload,
};
pub use crate::domain::ports::{ConfigProvider, MenuSource, Notifier, NutritionSource};
pub use crate::utils::error::Result;
