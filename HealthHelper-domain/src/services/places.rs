use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::adapters::{LocationAdapter, PlacesAdapter};
use crate::entities::places::{GeoPosition, PlaceInfo, PlaceType};

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Could not get your current location.")]
    LocationUnavailable,
}

/// Places around the user's current position
#[derive(Debug, Clone)]
pub struct NearbyPlaces {
    pub center: GeoPosition,
    pub place_type: PlaceType,
    pub places: Vec<PlaceInfo>,
}

/// Nearby health facility lookup
pub struct PlacesService {
    location: Arc<dyn LocationAdapter>,
    places: Arc<dyn PlacesAdapter>,
}

impl PlacesService {
    pub fn new(location: Arc<dyn LocationAdapter>, places: Arc<dyn PlacesAdapter>) -> Self {
        Self { location, places }
    }

    pub async fn nearby(&self, place_type: PlaceType) -> Result<NearbyPlaces, PlacesError> {
        let center = self.location.current_position().await.map_err(|e| {
            warn!("Cannot look up {}: {}", place_type, e);
            PlacesError::LocationUnavailable
        })?;

        let places = self.places.nearby(center, place_type).await;
        Ok(NearbyPlaces { center, place_type, places })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CatalogPlacesAdapter;
    use crate::testing::MockLocation;

    #[tokio::test]
    async fn test_nearby_uses_current_position() {
        let service = PlacesService::new(Arc::new(MockLocation::at(10.0, 20.0)), Arc::new(CatalogPlacesAdapter::new()));
        let nearby = service.nearby(PlaceType::Hospital).await.unwrap();

        assert_eq!(nearby.center, GeoPosition::new(10.0, 20.0));
        assert_eq!(nearby.places.len(), 2);
        assert!(nearby.places.iter().all(|p| p.place_type == PlaceType::Hospital));
    }

    #[tokio::test]
    async fn test_nearby_without_location() {
        let service = PlacesService::new(Arc::new(MockLocation::unavailable()), Arc::new(CatalogPlacesAdapter::new()));
        let err = service.nearby(PlaceType::Fitness).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not get your current location.");
    }
}
