use crate::core::NutritionRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryThresholds {
    pub max_calories: u32,
    pub min_protein_grams: u32,
}

/// A record passes only when both calories and protein are known and within
/// the thresholds. Absent values always fail.
pub fn passes(record: &NutritionRecord, thresholds: &DietaryThresholds) -> bool {
    let within_calories = record
        .calories
        .is_some_and(|calories| calories <= f64::from(thresholds.max_calories));
    let enough_protein = record
        .protein_g
        .is_some_and(|protein| protein >= f64::from(thresholds.min_protein_grams));
    within_calories && enough_protein
}
