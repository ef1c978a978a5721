use std::fmt;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A height/weight pair as entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Measurement {
    /// Height in centimeters
    pub height_cm: f64,

    /// Weight in kilograms
    pub weight_kg: f64,
}

impl Measurement {
    pub fn new(height_cm: f64, weight_kg: f64) -> Self {
        Self { height_cm, weight_kg }
    }
}

/// BMI category following the WHO adult thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// BMI < 18.5
    Underweight,
    /// 18.5 <= BMI < 25
    Normal,
    /// 25 <= BMI < 30
    Overweight,
    /// 30 <= BMI < 35
    Obese,
    /// BMI >= 35
    SeverelyObese,
}

impl BmiCategory {
    /// All categories in ascending order of BMI
    pub const ALL: [BmiCategory; 5] = [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
        BmiCategory::SeverelyObese,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::SeverelyObese => "Severely Obese",
        }
    }

    /// Display color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "#2196F3",
            BmiCategory::Normal => "#4CAF50",
            BmiCategory::Overweight => "#FFC107",
            BmiCategory::Obese => "#FF5722",
            BmiCategory::SeverelyObese => "#F44336",
        }
    }

    /// Advisory text shown with a result in this category
    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "You're in the underweight range. Consider consulting with a healthcare professional about healthy weight gain strategies.",
            BmiCategory::Normal => "You're in a healthy weight range. Maintain your healthy lifestyle with balanced nutrition and regular physical activity.",
            BmiCategory::Overweight => "You're in the overweight range. Consider making lifestyle changes to reach a healthier weight.",
            BmiCategory::Obese => "You're in the obese range. It's advisable to consult with a healthcare professional to develop a plan for achieving a healthier weight.",
            BmiCategory::SeverelyObese => "You're in the severely obese range. Please consult with a healthcare professional to discuss appropriate weight management strategies.",
        }
    }

    /// Reference range as shown in the category legend
    pub fn range_label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "< 18.5",
            BmiCategory::Normal => "18.5 - 24.9",
            BmiCategory::Overweight => "25 - 29.9",
            BmiCategory::Obese => "30 - 34.9",
            BmiCategory::SeverelyObese => ">= 35",
        }
    }

    /// Inclusive lower bound of the category, if any
    pub fn lower_bound(&self) -> Option<f64> {
        match self {
            BmiCategory::Underweight => None,
            BmiCategory::Normal => Some(18.5),
            BmiCategory::Overweight => Some(25.0),
            BmiCategory::Obese => Some(30.0),
            BmiCategory::SeverelyObese => Some(35.0),
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of evaluating a measurement.
///
/// Only the evaluator builds these, so the category and description always
/// agree with the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BmiResult {
    bmi_value: f64,
    category: BmiCategory,
    description: String,
}

impl BmiResult {
    pub(crate) fn new(bmi_value: f64, category: BmiCategory) -> Self {
        Self {
            bmi_value,
            category,
            description: category.description().to_string(),
        }
    }

    /// Unrounded BMI value
    pub fn bmi_value(&self) -> f64 {
        self.bmi_value
    }

    /// BMI rounded to one decimal place for display
    pub fn display_value(&self) -> String {
        format!("{:.1}", self.bmi_value)
    }

    pub fn category(&self) -> BmiCategory {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_presentation() {
        assert_eq!(BmiCategory::SeverelyObese.to_string(), "Severely Obese");
        assert_eq!(BmiCategory::Normal.color(), "#4CAF50");
        assert_eq!(BmiCategory::Obese.range_label(), "30 - 34.9");
        assert!(BmiCategory::Overweight.description().contains("overweight range"));
    }

    #[test]
    fn test_lower_bounds_ascend() {
        let bounds: Vec<f64> = BmiCategory::ALL.iter().filter_map(|c| c.lower_bound()).collect();
        assert_eq!(bounds, vec![18.5, 25.0, 30.0, 35.0]);
    }

    #[test]
    fn test_result_display_value() {
        let result = BmiResult::new(24.221453, BmiCategory::Normal);
        assert_eq!(result.display_value(), "24.2");
        assert_eq!(result.description(), BmiCategory::Normal.description());
    }
}
