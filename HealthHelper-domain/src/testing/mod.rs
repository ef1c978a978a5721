// Testing utilities and mock adapters for the domain layer
// Available to this crate's tests and, with the "mock" feature, to dependents

// Re-export useful test mocks from the data layer
pub use health_helper_data::repository::tests::{MockAccountRepository, MockProfileRepository};

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use async_trait::async_trait;
use uuid::Uuid;

use crate::adapters::{
    AuthAdapter, AuthError, LocationAdapter, LocationUnavailable, MessagingAdapter,
    MessagingUnavailable, ProfileStoreAdapter, StoreError,
};
use crate::entities::places::GeoPosition;
use crate::entities::profile::{EmergencyContact, UserIdentity, UserProfile};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::validation::{check_email, check_password};

/// In-memory identity service with plain-text passwords
#[derive(Default)]
pub struct MockAuthAdapter {
    accounts: RwLock<HashMap<String, (UserIdentity, String)>>,
    signed_out: RwLock<Vec<String>>,
    failure: Option<String>,
}

impl MockAuthAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure every call to fail with a service error
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// User ids passed to `sign_out`, in call order
    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn check(&self) -> Result<(), AuthError> {
        match &self.failure {
            Some(message) => Err(AuthError::Service(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthAdapter for MockAuthAdapter {
    async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        self.check()?;
        check_email(email).map_err(|_| AuthError::InvalidEmail)?;
        check_password(password).map_err(|_| AuthError::WeakPassword)?;

        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let identity = UserIdentity {
            user_id: Uuid::new_v4().to_string(),
            email: key.clone(),
            display_name: String::new(),
        };
        accounts.insert(key, (identity.clone(), password.to_string()));
        Ok(identity)
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        self.check()?;
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        match accounts.get(&email.to_lowercase()) {
            Some((identity, stored)) if stored == password => Ok(identity.clone()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_out(&self, user_id: &str) {
        self.signed_out
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user_id.to_string());
    }
}

/// In-memory profile store with optional failure and latency
#[derive(Default)]
pub struct MockProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    should_fail: bool,
    delay: Option<Duration>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with a backend error
    pub fn failing() -> Self {
        Self { should_fail: true, ..Self::default() }
    }

    /// Delay every call, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Seed a profile without going through the adapter
    pub fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.user_id.clone(), profile);
    }

    async fn check(&self) -> Result<(), StoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            Err(StoreError::Backend("mock store is configured to fail".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_profile<T>(&self, user_id: &str, edit: impl FnOnce(&mut UserProfile) -> T) -> Result<T, StoreError> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        profiles
            .get_mut(user_id)
            .map(edit)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }
}

#[async_trait]
impl ProfileStoreAdapter for MockProfileStore {
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.check().await?;
        self.insert(profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        self.check().await?;
        self.with_profile(user_id, |profile| profile.clone())
    }

    async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), StoreError> {
        self.check().await?;
        self.with_profile(user_id, |profile| {
            profile.height = height;
            profile.weight = weight;
            profile.last_bmi = bmi;
        })
    }

    async fn save_contacts(&self, user_id: &str, contacts: &[EmergencyContact]) -> Result<(), StoreError> {
        self.check().await?;
        self.with_profile(user_id, |profile| profile.emergency_contacts = contacts.to_vec())
    }
}

/// Location service with a fixed answer
pub struct MockLocation {
    position: Option<GeoPosition>,
}

impl MockLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self { position: Some(GeoPosition::new(latitude, longitude)) }
    }

    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl LocationAdapter for MockLocation {
    async fn current_position(&self) -> Result<GeoPosition, LocationUnavailable> {
        self.position
            .ok_or_else(|| LocationUnavailable("mock location is unavailable".to_string()))
    }
}

/// Messaging handoff that records what it was asked to send
#[derive(Default)]
pub struct RecordingMessaging {
    sent: RwLock<Vec<(String, String)>>,
    failing_numbers: Vec<String>,
}

impl RecordingMessaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the handoff for the given phone numbers
    pub fn failing_for(numbers: &[&str]) -> Self {
        Self {
            failing_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// `(phone_number, text)` pairs handed off so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl MessagingAdapter for RecordingMessaging {
    async fn compose_message(&self, phone_number: &str, text: &str) -> Result<(), MessagingUnavailable> {
        if self.failing_numbers.iter().any(|n| n == phone_number) {
            return Err(MessagingUnavailable(format!("no handler for {}", phone_number)));
        }
        self.sent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((phone_number.to_string(), text.to_string()));
        Ok(())
    }
}

/// Mock implementation of the HealthServiceTrait for testing
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    system_status: SystemStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
        }
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self.system_status = SystemStatus::Unhealthy;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database is experiencing high load".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy | ComponentStatus::Degraded => Ok(true),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}
