use crate::core::RankedResult;
use chrono::NaiveDate;

pub const NO_PICKS_MESSAGE: &str = "No lunch options met your criteria today.";

pub fn build_title(date: NaiveDate) -> String {
    format!(
        "🥗 Top Healthy Lunch Picks — {} 🥗",
        date.format("%A, %B %d")
    )
}

pub fn build_message(result: &RankedResult) -> String {
    if result.is_empty() {
        return NO_PICKS_MESSAGE.to_string();
    }

    let mut lines = vec![
        format!("Here are today's top {} healthy lunch picks:", result.len()),
        String::new(),
    ];
    for (index, record) in result.records().enumerate() {
        lines.push(format!(
            "{}. {} ({})",
            index + 1,
            record.name,
            quantity(record.serving_size, record.serving_size_unit.as_deref()),
        ));
        lines.push(format!("   Calories: {}", quantity(record.calories, None)));
        lines.push(format!("   Protein: {}", grams(record.protein_g)));
        lines.push(format!("   Carbs: {}", grams(record.carbs_g)));
        lines.push(format!("   Fat: {}", grams(record.fat_g)));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn quantity(value: Option<f64>, unit: Option<&str>) -> String {
    match (value, unit) {
        (Some(v), Some(unit)) => format!("{} {}", v, unit),
        (Some(v), None) => v.to_string(),
        (None, _) => "n/a".to_string(),
    }
}

fn grams(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}g", v),
        None => "n/a".to_string(),
    }
}
