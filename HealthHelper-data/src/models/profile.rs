use serde::{Deserialize, Serialize};

/// Storage model for a user profile document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileRecord {
    /// Owner of the profile
    pub user_id: String,

    /// Email copied from the account at creation
    pub email: String,

    /// Display name
    pub display_name: String,

    /// Last committed height in centimeters (0 when never measured)
    pub height: f64,

    /// Last committed weight in kilograms (0 when never measured)
    pub weight: f64,

    /// Last committed BMI value (0 when never measured)
    pub last_bmi: f64,

    /// Emergency contacts, stored inline with the profile
    pub emergency_contacts: Vec<ContactRecord>,

    /// Free-form health conditions
    pub health_conditions: Vec<String>,

    /// RFC 3339 time of the last write
    pub updated_at: String,
}

/// Storage model for an emergency contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContactRecord {
    /// Contact identifier, unique within one profile
    pub id: String,

    /// Contact name
    pub name: String,

    /// Phone number as entered
    pub phone_number: String,

    /// Relationship to the user, may be empty
    #[serde(default)]
    pub relationship: String,
}
