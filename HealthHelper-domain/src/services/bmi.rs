use thiserror::Error;

use crate::entities::bmi::{BmiCategory, BmiResult, Measurement};

/// BMI evaluation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BmiError {
    /// Height or weight cannot produce a BMI
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),
}

/// Compute `weight / (height_m)^2`
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> Result<f64, BmiError> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(BmiError::InvalidMeasurement(format!(
            "height must be a positive number, got {}",
            height_cm
        )));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(BmiError::InvalidMeasurement(format!(
            "weight must be a positive number, got {}",
            weight_kg
        )));
    }

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Map a BMI value to its category; lower bounds are inclusive
pub fn categorize_bmi(bmi: f64) -> BmiCategory {
    BmiCategory::ALL
        .iter()
        .rev()
        .copied()
        .find(|category| category.lower_bound().map_or(true, |bound| bmi >= bound))
        .unwrap_or(BmiCategory::Underweight)
}

/// Evaluate a measurement into a full result
pub fn evaluate(measurement: &Measurement) -> Result<BmiResult, BmiError> {
    let bmi = calculate_bmi(measurement.height_cm, measurement.weight_kg)?;
    Ok(BmiResult::new(bmi, categorize_bmi(bmi)))
}
