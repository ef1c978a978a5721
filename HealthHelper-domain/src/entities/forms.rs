use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::bmi::Measurement;
use crate::services::validation::{
    check_email, check_not_blank, check_password, check_password_confirmation,
    check_password_present, check_phone_number, record, FieldIssue,
};

/// Finish a hand-written `validate` impl
fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        record(&mut errors, "email", check_email(&self.email));
        record(&mut errors, "password", check_password(&self.password));
        record(
            &mut errors,
            "confirm_password",
            check_password_confirmation(&self.password, &self.confirm_password),
        );
        finish(errors)
    }
}

/// Login form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        record(&mut errors, "email", check_email(&self.email));
        record(&mut errors, "password", check_password_present(&self.password));
        finish(errors)
    }
}

/// Emergency contact form, used for both add and edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ContactForm {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub relationship: String,
}

impl Validate for ContactForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        record(&mut errors, "name", check_not_blank(&self.name, FieldIssue::EmptyName));
        record(&mut errors, "phone_number", check_phone_number(&self.phone_number));
        finish(errors)
    }
}

/// Text sent with an SOS alert
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EmergencyMessageForm {
    pub message: String,
}

impl Validate for EmergencyMessageForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        record(&mut errors, "message", check_not_blank(&self.message, FieldIssue::EmptyMessage));
        finish(errors)
    }
}

/// BMI calculator input
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MeasurementForm {
    /// Height in centimeters
    #[validate(range(min = 100.0, max = 250.0, message = "Height should be between 100 and 250 cm"))]
    pub height_cm: f64,

    /// Weight in kilograms
    #[validate(range(min = 20.0, max = 300.0, message = "Weight should be between 20 and 300 kg"))]
    pub weight_kg: f64,
}

impl MeasurementForm {
    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.height_cm, self.weight_kg)
    }
}
