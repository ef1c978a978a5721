use serde::Serialize;
use utoipa::ToSchema;

use health_helper_domain::entities::bmi::BmiCategory;
use health_helper_domain::entities::profile::UserProfile;

/// The caller's stored profile with its derived BMI category
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: UserProfile,

    /// Category of the last committed BMI, absent until one is committed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<BmiCategory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_label: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        let bmi_category = profile.last_bmi_category();
        Self {
            bmi_label: bmi_category.map(|c| c.label().to_string()),
            bmi_category,
            profile,
        }
    }
}
