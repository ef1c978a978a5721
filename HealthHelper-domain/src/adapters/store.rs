use async_trait::async_trait;
use tracing::{debug, error};

use health_helper_data::repository::{ProfileRepository, ProfileRepositoryTrait, RepositoryError};

use crate::adapters::{ProfileStoreAdapter, StoreError};
use crate::entities::conversions::{convert_to_data_contact, convert_to_data_profile, convert_to_domain_profile};
use crate::entities::profile::{EmergencyContact, UserProfile};

/// Profile store backed by the data-layer profile repository
pub struct RepositoryProfileStore<R: ProfileRepositoryTrait> {
    repository: R,
}

impl<R: ProfileRepositoryTrait> RepositoryProfileStore<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(err: RepositoryError) -> StoreError {
        match err {
            RepositoryError::NotFound(msg) => StoreError::NotFound(msg),
            other => {
                error!("Profile repository failure: {}", other);
                StoreError::Backend(other.to_string())
            }
        }
    }
}

#[async_trait]
impl<R: ProfileRepositoryTrait + Send + Sync> ProfileStoreAdapter for RepositoryProfileStore<R> {
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        debug!("Saving profile for user {}", profile.user_id);
        self.repository
            .save(convert_to_data_profile(profile))
            .await
            .map(|_| ())
            .map_err(Self::map_repo_error)
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        match self.repository.get_by_user_id(user_id).await {
            Ok(Some(record)) => Ok(convert_to_domain_profile(record)),
            Ok(None) => Err(StoreError::NotFound(format!("Profile for user {} not found", user_id))),
            Err(e) => Err(Self::map_repo_error(e)),
        }
    }

    async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), StoreError> {
        debug!("Updating measurement for user {}", user_id);
        self.repository
            .update_measurement(user_id, height, weight, bmi)
            .await
            .map_err(Self::map_repo_error)
    }

    async fn save_contacts(&self, user_id: &str, contacts: &[EmergencyContact]) -> Result<(), StoreError> {
        debug!("Saving {} emergency contacts for user {}", contacts.len(), user_id);
        let records = contacts.iter().map(convert_to_data_contact).collect();
        self.repository
            .update_contacts(user_id, records)
            .await
            .map_err(Self::map_repo_error)
    }
}

/// Create the default profile store over the global database pool
pub fn create_default_profile_store() -> RepositoryProfileStore<ProfileRepository> {
    RepositoryProfileStore::new(ProfileRepository::new())
}
