use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::bmi::BmiCategory;
use crate::services::bmi::categorize_bmi;

/// Identity returned by the authentication adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserIdentity {
    /// Stable identifier assigned at registration
    pub user_id: String,

    /// Email the account was registered with
    pub email: String,

    /// Optional display name, empty when never set
    #[serde(default)]
    pub display_name: String,
}

/// Id of the contact every new profile starts with
pub const EMERGENCY_SERVICES_CONTACT_ID: &str = "1";

/// A person to notify in an emergency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EmergencyContact {
    /// Identifier unique within the owning profile
    pub id: String,

    /// Display name
    pub name: String,

    /// Phone number, digits and `+-() ` only
    pub phone_number: String,

    /// Optional relationship to the user (e.g. "Sister")
    #[serde(default)]
    pub relationship: String,
}

/// The persistent per-user health document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,

    /// Last committed height in cm, 0 when never measured
    #[serde(default)]
    pub height: f64,

    /// Last committed weight in kg, 0 when never measured
    #[serde(default)]
    pub weight: f64,

    /// Last committed BMI, 0 when never measured
    #[serde(default)]
    pub last_bmi: f64,

    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,

    #[serde(default)]
    pub health_conditions: Vec<String>,
}

impl EmergencyContact {
    /// The public emergency number, listed until the user removes it
    pub fn emergency_services() -> Self {
        Self {
            id: EMERGENCY_SERVICES_CONTACT_ID.to_string(),
            name: "Emergency Services".to_string(),
            phone_number: "911".to_string(),
            relationship: String::new(),
        }
    }
}

impl UserProfile {
    /// The profile written right after registration: no measurement yet,
    /// and emergency services as the only contact
    pub fn initial(identity: &UserIdentity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            emergency_contacts: vec![EmergencyContact::emergency_services()],
            ..Self::default()
        }
    }

    /// Whether a measurement has ever been committed
    pub fn has_measurement(&self) -> bool {
        self.last_bmi > 0.0
    }

    /// Category of the last committed BMI
    pub fn last_bmi_category(&self) -> Option<BmiCategory> {
        self.has_measurement().then(|| categorize_bmi(self.last_bmi))
    }

    /// Find a contact by id
    pub fn contact(&self, contact_id: &str) -> Option<&EmergencyContact> {
        self.emergency_contacts.iter().find(|c| c.id == contact_id)
    }
}
