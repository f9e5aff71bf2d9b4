use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One dish on today's lunch menu, as scraped from the menu page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub nonce: String,
    pub name: String,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, nonce: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nonce: nonce.into(),
            name: name.into(),
        }
    }
}

/// Nutrition endpoint response. Entries stay loosely typed so that partial or
/// oddly-typed payloads reach the normalizer instead of failing decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNutritionPayload {
    #[serde(default, deserialize_with = "items_map")]
    pub items: HashMap<String, Value>,
}

/// The endpoint sends `[]` (or `null`) instead of `{}` when it has no entries.
fn items_map<'de, D>(deserializer: D) -> Result<HashMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(entries) => Ok(entries.into_iter().collect()),
        Value::Null => Ok(HashMap::new()),
        Value::Array(entries) if entries.is_empty() => Ok(HashMap::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected an object of items, found {}",
            other
        ))),
    }
}

/// Canonical nutrition data for one menu item.
///
/// Numeric fields are `None` when the upstream value was missing or could not
/// be parsed; absent is never conflated with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub id: String,
    pub name: String,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<String>,
    pub ingredients_lowercased: String,
    pub dairy_free: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPick {
    pub record: NutritionRecord,
    pub score: f64,
}

/// Where every dispatched item ended up during one ranking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankStats {
    pub dispatched: usize,
    pub fetch_failures: usize,
    pub normalization_failures: usize,
    pub filtered_out: usize,
    pub unscorable: usize,
    pub survivors: usize,
}

impl RankStats {
    /// Number of task outcomes received by the aggregator.
    pub fn accounted(&self) -> usize {
        self.fetch_failures
            + self.normalization_failures
            + self.filtered_out
            + self.unscorable
            + self.survivors
    }
}

/// Top picks in descending score order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    pub picks: Vec<RankedPick>,
    pub stats: RankStats,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &NutritionRecord> {
        self.picks.iter().map(|pick| &pick.record)
    }
}
