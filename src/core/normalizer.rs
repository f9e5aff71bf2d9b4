use crate::core::{NutritionRecord, RawNutritionPayload};
use crate::utils::error::{LunchError, Result};
use serde_json::{Map, Value};

pub const CALORIES_KEY: &str = "calories";
pub const PROTEIN_KEY: &str = "proteinContent";
pub const FAT_KEY: &str = "fatContent";
pub const CARBS_KEY: &str = "carbohydrateContent";
pub const SERVING_SIZE_KEY: &str = "servingSize";

const DAIRY_KEYWORDS: [&str; 6] = ["milk", "cheese", "butter", "cream", "whey", "casein"];

/// Builds the canonical record for `id` out of a raw endpoint payload.
///
/// Individual nutrient values that are missing or unparseable become `None`.
/// A missing item entry or a missing `servingSize` entry fails the whole item.
pub fn normalize(raw: &RawNutritionPayload, name: &str, id: &str) -> Result<NutritionRecord> {
    let item = raw
        .items
        .get(id)
        .ok_or_else(|| normalization_error(id, "item missing from response"))?
        .as_object()
        .ok_or_else(|| normalization_error(id, "item entry is not an object"))?;

    let empty = Map::new();
    let nutrition = item
        .get("nutrition_details")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let ingredients_lowercased = item
        .get("ingredient_details")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    let serving_size_unit = nutrition
        .get(SERVING_SIZE_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| normalization_error(id, "servingSize missing from nutrition details"))?
        .get("unit")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(NutritionRecord {
        id: id.to_string(),
        name: name.to_string(),
        calories: nutrient_value(nutrition, CALORIES_KEY),
        protein_g: nutrient_value(nutrition, PROTEIN_KEY),
        fat_g: nutrient_value(nutrition, FAT_KEY),
        carbs_g: nutrient_value(nutrition, CARBS_KEY),
        serving_size: nutrient_value(nutrition, SERVING_SIZE_KEY),
        serving_size_unit,
        dairy_free: is_dairy_free(&ingredients_lowercased),
        ingredients_lowercased,
    })
}

/// Reads `nutrition[key].value` as a float.
pub fn nutrient_value(nutrition: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = nutrition.get(key)?.get("value")?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn is_dairy_free(ingredients_lowercased: &str) -> bool {
    !DAIRY_KEYWORDS
        .iter()
        .any(|keyword| ingredients_lowercased.contains(keyword))
}

fn normalization_error(id: &str, message: &str) -> LunchError {
    LunchError::NormalizationError {
        id: id.to_string(),
        message: message.to_string(),
    }
}
