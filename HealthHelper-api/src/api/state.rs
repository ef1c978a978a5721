use std::sync::Arc;
use tracing::info;

use health_helper_domain::adapters::identity::create_default_auth_adapter;
use health_helper_domain::adapters::store::create_default_profile_store;
use health_helper_domain::adapters::{
    AuthAdapter, CatalogPlacesAdapter, FixedLocationAdapter, LocationAdapter, MessagingAdapter,
    PlacesAdapter, ProfileStoreAdapter, SmsIntentAdapter,
};
use health_helper_domain::auth::{AuthService, TokenSettings};
use health_helper_domain::services::{ContactService, EmergencyAlertService, MeasurementService, PlacesService};
use health_helper_domain::session::SessionRegistry;

use crate::config::AppConfig;

/// The external collaborators every service is built from
#[derive(Clone)]
pub struct Adapters {
    pub auth: Arc<dyn AuthAdapter>,
    pub profiles: Arc<dyn ProfileStoreAdapter>,
    pub location: Arc<dyn LocationAdapter>,
    pub messaging: Arc<dyn MessagingAdapter>,
    pub places: Arc<dyn PlacesAdapter>,
}

impl Adapters {
    /// Database-backed accounts and profiles, device location from the
    /// environment, `smsto:` handoff and the bundled places catalogue
    pub fn from_env() -> Self {
        Self {
            auth: Arc::new(create_default_auth_adapter()),
            profiles: Arc::new(create_default_profile_store()),
            location: Arc::new(FixedLocationAdapter::from_env()),
            messaging: Arc::new(SmsIntentAdapter::new()),
            places: Arc::new(CatalogPlacesAdapter::new()),
        }
    }
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub measurements: Arc<MeasurementService>,
    pub contacts: Arc<ContactService>,
    pub alerts: Arc<EmergencyAlertService>,
    pub places: Arc<PlacesService>,
    pub profiles: Arc<dyn ProfileStoreAdapter>,
    pub sessions: Arc<SessionRegistry>,
    pub tokens: Arc<TokenSettings>,
    pub default_emergency_message: String,
}

impl AppState {
    pub fn new(adapters: Adapters, tokens: TokenSettings, config: &AppConfig) -> Self {
        info!(
            "Building services (profile timeout {:?})",
            config.profile_create_timeout
        );

        let auth = AuthService::new(adapters.auth, adapters.profiles.clone())
            .with_profile_timeout(config.profile_create_timeout);

        Self {
            auth: Arc::new(auth),
            measurements: Arc::new(MeasurementService::new(adapters.profiles.clone())),
            contacts: Arc::new(ContactService::new(adapters.profiles.clone())),
            alerts: Arc::new(EmergencyAlertService::new(
                adapters.location.clone(),
                adapters.messaging,
            )),
            places: Arc::new(PlacesService::new(adapters.location, adapters.places)),
            profiles: adapters.profiles,
            sessions: Arc::new(SessionRegistry::new()),
            tokens: Arc::new(tokens),
            default_emergency_message: config.default_emergency_message.clone(),
        }
    }
}
