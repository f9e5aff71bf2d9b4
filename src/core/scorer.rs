use crate::core::NutritionRecord;

/// Protein grams per calorie, scaled by ten.
pub fn protein_score(record: &NutritionRecord) -> Option<f64> {
    let calories = positive_calories(record)?;
    Some(record.protein_g? * 10.0 / calories)
}

/// Serving size per calorie, scaled by a hundred.
pub fn volume_score(record: &NutritionRecord) -> Option<f64> {
    let calories = positive_calories(record)?;
    Some(record.serving_size? * 100.0 / calories)
}

/// Rewards items that are both protein-dense and large per calorie.
///
/// Returns `None` for records that cannot be scored: unknown or non-positive
/// calories, unknown protein, or unknown serving size. Such records are left
/// out of the ranking.
pub fn score(record: &NutritionRecord) -> Option<f64> {
    Some(protein_score(record)? * volume_score(record)?)
}

fn positive_calories(record: &NutritionRecord) -> Option<f64> {
    record.calories.filter(|calories| *calories > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(calories: Option<f64>, protein_g: Option<f64>, serving: Option<f64>) -> NutritionRecord {
        NutritionRecord {
            id: "1".to_string(),
            name: "Test".to_string(),
            calories,
            protein_g,
            fat_g: None,
            carbs_g: None,
            serving_size: serving,
            serving_size_unit: Some("g".to_string()),
            ingredients_lowercased: String::new(),
            dairy_free: true,
        }
    }

    #[test]
    fn test_score_formula() {
        let r = record(Some(500.0), Some(40.0), Some(300.0));
        assert_eq!(protein_score(&r), Some(0.8));
        assert_eq!(volume_score(&r), Some(60.0));
        let score = score(&r).unwrap();
        assert!((score - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_calories_is_unscorable() {
        assert_eq!(score(&record(Some(0.0), Some(30.0), Some(200.0))), None);
        assert_eq!(score(&record(Some(-5.0), Some(30.0), Some(200.0))), None);
    }

    #[test]
    fn test_missing_serving_size_is_unscorable() {
        let r = record(Some(500.0), Some(40.0), None);
        assert_eq!(volume_score(&r), None);
        assert_eq!(score(&r), None);
        assert!(protein_score(&r).is_some());
    }

    #[test]
    fn test_more_protein_scores_higher() {
        let lean = record(Some(600.0), Some(45.0), Some(350.0));
        let heavy = record(Some(600.0), Some(25.0), Some(350.0));
        assert!(score(&lean).unwrap() > score(&heavy).unwrap());
    }
}
