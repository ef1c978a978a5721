use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_helper_domain::entities::places::GeoPosition;
use health_helper_domain::services::{AlertReport, ContactDispatch};

/// SOS request; the configured default message is used when omitted
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SosRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// What happened when the alert was handed off
#[derive(Debug, Serialize, ToSchema)]
pub struct SosResponse {
    /// Text handed to the messaging service for every contact
    pub text: String,

    pub location_included: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPosition>,

    /// Number of contacts the alert was handed off for
    pub handed_off: usize,

    pub dispatches: Vec<ContactDispatch>,

    /// One notice per contact that could not be messaged
    pub notices: Vec<String>,
}

impl From<AlertReport> for SosResponse {
    fn from(report: AlertReport) -> Self {
        Self {
            location_included: report.location_included(),
            handed_off: report.handed_off_count(),
            notices: report.notices(),
            text: report.text,
            location: report.location,
            dispatches: report.dispatches,
        }
    }
}
