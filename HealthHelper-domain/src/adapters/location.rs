use std::env;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::adapters::{LocationAdapter, LocationUnavailable};
use crate::entities::places::GeoPosition;

/// Location service reporting a configured device position.
///
/// A server has no GPS; the position comes from `DEVICE_LATITUDE` and
/// `DEVICE_LONGITUDE`, and is unavailable when either is missing.
#[derive(Debug, Clone, Default)]
pub struct FixedLocationAdapter {
    position: Option<GeoPosition>,
}

impl FixedLocationAdapter {
    pub fn new(position: Option<GeoPosition>) -> Self {
        Self { position }
    }

    /// An adapter that never has a fix
    pub fn unavailable() -> Self {
        Self { position: None }
    }

    /// Read the position from the environment
    pub fn from_env() -> Self {
        let latitude = env::var("DEVICE_LATITUDE").ok().and_then(|v| v.trim().parse::<f64>().ok());
        let longitude = env::var("DEVICE_LONGITUDE").ok().and_then(|v| v.trim().parse::<f64>().ok());

        match (latitude, longitude) {
            (Some(lat), Some(lng)) => {
                let position = GeoPosition::new(lat, lng);
                if position.is_valid() {
                    info!("Device location configured at {},{}", lat, lng);
                    Self::new(Some(position))
                } else {
                    warn!("Ignoring out-of-range device location {},{}", lat, lng);
                    Self::unavailable()
                }
            },
            _ => {
                info!("No device location configured; alerts will be sent without a location link");
                Self::unavailable()
            }
        }
    }
}

#[async_trait]
impl LocationAdapter for FixedLocationAdapter {
    async fn current_position(&self) -> Result<GeoPosition, LocationUnavailable> {
        self.position
            .ok_or_else(|| LocationUnavailable("no location fix available".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_position() {
        let adapter = FixedLocationAdapter::new(Some(GeoPosition::new(40.7128, -74.006)));
        assert_eq!(adapter.current_position().await.unwrap(), GeoPosition::new(40.7128, -74.006));
    }

    #[tokio::test]
    async fn test_unavailable_position() {
        assert!(FixedLocationAdapter::unavailable().current_position().await.is_err());
    }
}
