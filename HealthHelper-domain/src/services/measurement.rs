use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationErrors};

use crate::adapters::{ProfileStoreAdapter, StoreError};
use crate::entities::bmi::BmiResult;
use crate::entities::forms::MeasurementForm;
use crate::services::bmi::{evaluate, BmiError};
use crate::services::validation::summarize;

/// Errors from the BMI calculator flow
#[derive(Debug, Error)]
pub enum MeasurementError {
    /// Form fields failed validation; nothing was evaluated
    #[error("Validation error: {}", summarize(.0))]
    Validation(ValidationErrors),

    #[error(transparent)]
    Bmi(#[from] BmiError),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// The result was computed but could not be saved
    #[error("Could not save your measurement: {0}")]
    Store(String),
}

/// BMI calculator flow: validate, evaluate and optionally commit
pub struct MeasurementService {
    store: Arc<dyn ProfileStoreAdapter>,
}

impl MeasurementService {
    pub fn new(store: Arc<dyn ProfileStoreAdapter>) -> Self {
        Self { store }
    }

    /// Validate the form and evaluate it without touching the store
    pub fn evaluate_form(&self, form: &MeasurementForm) -> Result<BmiResult, MeasurementError> {
        form.validate().map_err(MeasurementError::Validation)?;
        Ok(evaluate(&form.measurement())?)
    }

    /// Evaluate the form and overwrite the user's stored measurement
    pub async fn commit(&self, user_id: &str, form: &MeasurementForm) -> Result<BmiResult, MeasurementError> {
        let result = self.evaluate_form(form)?;

        self.store
            .update_measurement(user_id, form.height_cm, form.weight_kg, result.bmi_value())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(msg) => MeasurementError::ProfileNotFound(msg),
                StoreError::Backend(msg) => {
                    error!("Failed to store measurement for user {}: {}", user_id, msg);
                    MeasurementError::Store(msg)
                }
            })?;

        info!("Committed BMI {:.1} ({}) for user {}", result.bmi_value(), result.category(), user_id);
        Ok(result)
    }
}
