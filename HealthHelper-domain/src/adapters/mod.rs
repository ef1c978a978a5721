//! Contracts for the external collaborators the flows depend on.
//!
//! Every collaborator is an `async_trait` object so flows can be wired to
//! the bundled local implementations, or to mocks in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::places::{GeoPosition, PlaceInfo, PlaceType};
use crate::entities::profile::{EmergencyContact, UserIdentity, UserProfile};

pub mod identity;
pub mod location;
pub mod messaging;
pub mod places;
pub mod store;

pub use identity::LocalAuthAdapter;
pub use location::FixedLocationAdapter;
pub use messaging::{OutboxEntry, SmsIntentAdapter};
pub use places::CatalogPlacesAdapter;
pub use store::RepositoryProfileStore;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account already exists with this email.")]
    EmailAlreadyInUse,

    #[error("Password is too weak. It must be at least 6 characters.")]
    WeakPassword,

    #[error("Invalid email format.")]
    InvalidEmail,

    /// The identity service failed for another reason
    #[error("Authentication service error: {0}")]
    Service(String),
}

/// Profile store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Profile store error: {0}")]
    Backend(String),
}

/// The device position could not be determined
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Location unavailable: {0}")]
pub struct LocationUnavailable(pub String);

/// The message handoff failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Messaging unavailable: {0}")]
pub struct MessagingUnavailable(pub String);

/// Identity service
#[async_trait]
pub trait AuthAdapter: Send + Sync {
    /// Create an account and return its identity
    async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError>;

    /// Authenticate an existing account
    async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError>;

    /// End the user's session with the identity service
    async fn sign_out(&self, user_id: &str);
}

/// Document store holding one profile per user
#[async_trait]
pub trait ProfileStoreAdapter: Send + Sync {
    /// Create or overwrite a profile
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, StoreError>;

    /// Overwrite the measurement fields only
    async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), StoreError>;

    /// Replace the emergency contact list only
    async fn save_contacts(&self, user_id: &str, contacts: &[EmergencyContact]) -> Result<(), StoreError>;

    async fn get_contacts(&self, user_id: &str) -> Result<Vec<EmergencyContact>, StoreError> {
        Ok(self.get_profile(user_id).await?.emergency_contacts)
    }
}

/// Device location service
#[async_trait]
pub trait LocationAdapter: Send + Sync {
    async fn current_position(&self) -> Result<GeoPosition, LocationUnavailable>;
}

/// SMS composition handoff. Success means the handoff happened, not delivery.
#[async_trait]
pub trait MessagingAdapter: Send + Sync {
    async fn compose_message(&self, phone_number: &str, text: &str) -> Result<(), MessagingUnavailable>;
}

/// Nearby place lookup
#[async_trait]
pub trait PlacesAdapter: Send + Sync {
    async fn nearby(&self, center: GeoPosition, place_type: PlaceType) -> Vec<PlaceInfo>;
}
