use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::adapters::PlacesAdapter;
use crate::entities::places::{GeoPosition, PlaceInfo, PlaceType};

/// Maximum offset in degrees applied to each catalogue entry
pub const SCATTER_DEGREES: f64 = 0.005;

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    place_type: PlaceType,
}

const CATALOG: [CatalogEntry; 6] = [
    CatalogEntry { id: "h1", name: "Community General Hospital", address: "123 Health Avenue", place_type: PlaceType::Hospital },
    CatalogEntry { id: "h2", name: "Family Health Center", address: "456 Wellness Street", place_type: PlaceType::Hospital },
    CatalogEntry { id: "p1", name: "Community Pharmacy", address: "789 Medicine Road", place_type: PlaceType::Pharmacy },
    CatalogEntry { id: "p2", name: "Health First Pharmacy", address: "321 Remedy Lane", place_type: PlaceType::Pharmacy },
    CatalogEntry { id: "f1", name: "Community Fitness Center", address: "555 Wellness Way", place_type: PlaceType::Fitness },
    CatalogEntry { id: "f2", name: "Health Zone Gym", address: "777 Exercise Avenue", place_type: PlaceType::Fitness },
];

/// Places lookup over a fixed catalogue scattered around the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogPlacesAdapter;

impl CatalogPlacesAdapter {
    pub fn new() -> Self {
        Self
    }

    fn scatter(center: GeoPosition, place_type: PlaceType) -> Vec<PlaceInfo> {
        let mut rng = rand::thread_rng();
        CATALOG
            .iter()
            .filter(|entry| entry.place_type == place_type)
            .map(|entry| PlaceInfo {
                id: entry.id.to_string(),
                name: entry.name.to_string(),
                address: entry.address.to_string(),
                position: GeoPosition::new(
                    center.latitude + rng.gen_range(-SCATTER_DEGREES..=SCATTER_DEGREES),
                    center.longitude + rng.gen_range(-SCATTER_DEGREES..=SCATTER_DEGREES),
                ),
                place_type: entry.place_type,
            })
            .collect()
    }
}

#[async_trait]
impl PlacesAdapter for CatalogPlacesAdapter {
    async fn nearby(&self, center: GeoPosition, place_type: PlaceType) -> Vec<PlaceInfo> {
        let places = Self::scatter(center, place_type);
        debug!("Found {} {} near {},{}", places.len(), place_type, center.latitude, center.longitude);
        places
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nearby_filters_and_scatters() {
        let center = GeoPosition::new(51.5074, -0.1278);
        let places = CatalogPlacesAdapter::new().nearby(center, PlaceType::Pharmacy).await;

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Community Pharmacy");
        for place in &places {
            assert_eq!(place.place_type, PlaceType::Pharmacy);
            assert!((place.position.latitude - center.latitude).abs() <= SCATTER_DEGREES + 1e-9);
            assert!((place.position.longitude - center.longitude).abs() <= SCATTER_DEGREES + 1e-9);
        }
    }

    #[tokio::test]
    async fn test_every_type_has_entries() {
        let center = GeoPosition::new(0.0, 0.0);
        for place_type in [PlaceType::Hospital, PlaceType::Pharmacy, PlaceType::Fitness] {
            assert_eq!(CatalogPlacesAdapter::new().nearby(center, place_type).await.len(), 2);
        }
    }
}
