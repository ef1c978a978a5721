use std::fmt;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both coordinates are finite and within their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Map link pointing at this position
    pub fn maps_link(&self) -> String {
        format!("https://maps.google.com/?q={},{}", self.latitude, self.longitude)
    }
}

/// Kinds of nearby places the map can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Hospital,
    Pharmacy,
    Fitness,
}

impl PlaceType {
    /// Label of the map filter for this type
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaceType::Hospital => "Hospitals",
            PlaceType::Pharmacy => "Pharmacies",
            PlaceType::Fitness => "Fitness Centers",
        }
    }

    /// Parse a query value such as `hospital`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hospital" | "hospitals" => Some(PlaceType::Hospital),
            "pharmacy" | "pharmacies" => Some(PlaceType::Pharmacy),
            "fitness" | "gym" | "fitness_center" => Some(PlaceType::Fitness),
            _ => None,
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A point of interest near the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PlaceInfo {
    pub id: String,
    pub name: String,
    pub address: String,
    pub position: GeoPosition,
    pub place_type: PlaceType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_link() {
        let position = GeoPosition::new(37.4219983, -122.084);
        assert_eq!(position.maps_link(), "https://maps.google.com/?q=37.4219983,-122.084");
    }

    #[test]
    fn test_position_validity() {
        assert!(GeoPosition::new(0.0, 0.0).is_valid());
        assert!(!GeoPosition::new(91.0, 0.0).is_valid());
        assert!(!GeoPosition::new(f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_place_type_parse() {
        assert_eq!(PlaceType::parse("Hospital"), Some(PlaceType::Hospital));
        assert_eq!(PlaceType::parse("pharmacies"), Some(PlaceType::Pharmacy));
        assert_eq!(PlaceType::parse("gym"), Some(PlaceType::Fitness));
        assert_eq!(PlaceType::parse("spa"), None);
        assert_eq!(PlaceType::Fitness.to_string(), "Fitness Centers");
    }
}
