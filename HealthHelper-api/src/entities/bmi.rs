use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_helper_domain::entities::bmi::{BmiCategory, BmiResult};

/// An evaluated BMI as shown on the calculator screen
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BmiResponse {
    /// Unrounded BMI
    pub bmi: f64,

    /// BMI rounded to one decimal place
    pub display_value: String,

    pub category: BmiCategory,

    /// e.g. "Severely Obese"
    pub label: String,

    /// Hex color for the category
    pub color: String,

    /// Advisory text for the category
    pub description: String,

    /// Reference range of the category, e.g. "25 - 29.9"
    pub range: String,

    /// Whether the measurement was stored on the profile
    pub saved: bool,
}

impl BmiResponse {
    pub fn new(result: &BmiResult, saved: bool) -> Self {
        let category = result.category();
        Self {
            bmi: result.bmi_value(),
            display_value: result.display_value(),
            category,
            label: category.label().to_string(),
            color: category.color().to_string(),
            description: result.description().to_string(),
            range: category.range_label().to_string(),
            saved,
        }
    }
}

/// One row of the category legend
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BmiCategoryInfo {
    pub category: BmiCategory,
    pub label: String,
    pub color: String,
    pub range: String,
    pub description: String,
}

impl From<BmiCategory> for BmiCategoryInfo {
    fn from(category: BmiCategory) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            color: category.color().to_string(),
            range: category.range_label().to_string(),
            description: category.description().to_string(),
        }
    }
}
