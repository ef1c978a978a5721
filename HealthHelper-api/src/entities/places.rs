use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_helper_domain::entities::places::{GeoPosition, PlaceInfo, PlaceType};
use health_helper_domain::services::NearbyPlaces;

/// Query parameters for the nearby places map
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PlacesQuery {
    /// hospital, pharmacy or fitness (default: hospital)
    #[serde(rename = "type")]
    pub place_type: Option<String>,
}

/// Places around the current position
#[derive(Debug, Serialize, ToSchema)]
pub struct PlacesResponse {
    pub center: GeoPosition,
    pub place_type: PlaceType,

    /// Filter label, e.g. "Pharmacies"
    pub label: String,

    pub places: Vec<PlaceInfo>,
}

impl From<NearbyPlaces> for PlacesResponse {
    fn from(nearby: NearbyPlaces) -> Self {
        Self {
            center: nearby.center,
            place_type: nearby.place_type,
            label: nearby.place_type.display_name().to_string(),
            places: nearby.places,
        }
    }
}
