use chrono::Utc;
use tracing::{debug, error};
use async_trait::async_trait;

use crate::database::{get_db_pool, DatabaseError, DatabasePool};
use crate::models::profile::{ContactRecord, ProfileRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for user profile documents
#[async_trait]
pub trait ProfileRepositoryTrait {
    /// Create or overwrite a profile
    async fn save(&self, profile: ProfileRecord) -> Result<ProfileRecord, RepositoryError>;

    /// Get a profile by user id
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// Overwrite height, weight and last BMI; `NotFound` if the profile is missing
    async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), RepositoryError>;

    /// Replace the emergency contact list; `NotFound` if the profile is missing
    async fn update_contacts(&self, user_id: &str, contacts: Vec<ContactRecord>) -> Result<(), RepositoryError>;
}

/// Repository for user profiles.
/// Uses the SQLite pool when available and shared in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct ProfileRepository {
    /// Explicit pool; the global pool is used when absent
    pool: Option<DatabasePool>,
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl ProfileRepository {
    /// Create a repository backed by the global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository backed by the given pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    fn pool(&self) -> Result<DatabasePool, DatabaseError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => get_db_pool(),
        }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn save(&self, mut profile: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        profile.updated_at = Utc::now().to_rfc3339();

        match self.pool() {
            Ok(pool) => {
                match DatabaseStorage::upsert_profile(&pool, &profile).await {
                    Ok(_) => Ok(profile),
                    Err(e) if e.is_backend_failure() => {
                        error!("Failed to store profile in database: {}", e);
                        self.storage.upsert_profile(&profile).await.map(|_| profile)
                    },
                    Err(e) => Err(e),
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.upsert_profile(&profile).await.map(|_| profile)
            }
        }
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        match self.pool() {
            Ok(pool) => {
                match DatabaseStorage::get_profile(&pool, user_id).await {
                    Ok(Some(profile)) => Ok(Some(profile)),
                    Ok(None) => self.storage.get_profile(user_id).await,
                    Err(e) if e.is_backend_failure() => {
                        error!("Failed to get profile from database: {}", e);
                        self.storage.get_profile(user_id).await
                    },
                    Err(e) => Err(e),
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_by_user_id", e);
                self.storage.get_profile(user_id).await
            }
        }
    }

    async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        let updated = match self.pool() {
            Ok(pool) => {
                match DatabaseStorage::update_measurement(&pool, user_id, height, weight, bmi, &now).await {
                    Ok(true) => true,
                    Ok(false) => self.storage.update_measurement(user_id, height, weight, bmi, &now).await?,
                    Err(e) => {
                        error!("Failed to update measurement in database: {}", e);
                        self.storage.update_measurement(user_id, height, weight, bmi, &now).await?
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for update_measurement", e);
                self.storage.update_measurement(user_id, height, weight, bmi, &now).await?
            }
        };

        if updated {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("Profile for user {} not found", user_id)))
        }
    }

    async fn update_contacts(&self, user_id: &str, contacts: Vec<ContactRecord>) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        let updated = match self.pool() {
            Ok(pool) => {
                match DatabaseStorage::update_contacts(&pool, user_id, &contacts, &now).await {
                    Ok(true) => true,
                    Ok(false) => self.storage.update_contacts(user_id, &contacts, &now).await?,
                    Err(e) => {
                        error!("Failed to update contacts in database: {}", e);
                        self.storage.update_contacts(user_id, &contacts, &now).await?
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for update_contacts", e);
                self.storage.update_contacts(user_id, &contacts, &now).await?
            }
        };

        if updated {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("Profile for user {} not found", user_id)))
        }
    }
}

/// Mock profile repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock implementation of ProfileRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockProfileRepository {
        profiles: Mutex<HashMap<String, ProfileRecord>>,
        should_fail: bool,
    }

    impl MockProfileRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository whose every call fails
        pub fn failing() -> Self {
            Self { should_fail: true, ..Self::default() }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.should_fail {
                Err(RepositoryError::Database(DatabaseError::Unavailable(
                    "mock is configured to fail".to_string(),
                )))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn save(&self, profile: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
            self.check()?;
            self.profiles.lock()?.insert(profile.user_id.clone(), profile.clone());
            Ok(profile)
        }

        async fn get_by_user_id(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
            self.check()?;
            Ok(self.profiles.lock()?.get(user_id).cloned())
        }

        async fn update_measurement(&self, user_id: &str, height: f64, weight: f64, bmi: f64) -> Result<(), RepositoryError> {
            self.check()?;
            let mut profiles = self.profiles.lock()?;
            let profile = profiles
                .get_mut(user_id)
                .ok_or_else(|| RepositoryError::NotFound(user_id.to_string()))?;
            profile.height = height;
            profile.weight = weight;
            profile.last_bmi = bmi;
            Ok(())
        }

        async fn update_contacts(&self, user_id: &str, contacts: Vec<ContactRecord>) -> Result<(), RepositoryError> {
            self.check()?;
            let mut profiles = self.profiles.lock()?;
            let profile = profiles
                .get_mut(user_id)
                .ok_or_else(|| RepositoryError::NotFound(user_id.to_string()))?;
            profile.emergency_contacts = contacts;
            Ok(())
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        fn profile(user_id: &str) -> ProfileRecord {
            ProfileRecord {
                user_id: user_id.to_string(),
                email: format!("{}@example.com", user_id),
                ..ProfileRecord::default()
            }
        }

        #[tokio::test]
        async fn test_profile_round_trip_through_sqlite() {
            let repo = ProfileRepository::with_pool(DatabasePool::in_memory().unwrap());

            let mut record = profile("u1");
            record.health_conditions = vec!["asthma".to_string()];
            repo.save(record).await.unwrap();

            repo.update_measurement("u1", 170.0, 70.0, 24.22).await.unwrap();
            repo.update_contacts("u1", vec![ContactRecord {
                id: "1".to_string(),
                name: "Emergency Services".to_string(),
                phone_number: "911".to_string(),
                relationship: String::new(),
            }]).await.unwrap();

            let stored = repo.get_by_user_id("u1").await.unwrap().unwrap();
            assert_eq!(stored.height, 170.0);
            assert_eq!(stored.weight, 70.0);
            assert_eq!(stored.last_bmi, 24.22);
            assert_eq!(stored.emergency_contacts.len(), 1);
            assert_eq!(stored.emergency_contacts[0].phone_number, "911");
            assert_eq!(stored.health_conditions, vec!["asthma".to_string()]);
        }

        #[tokio::test]
        async fn test_update_missing_profile_is_not_found() {
            let repo = ProfileRepository::with_pool(DatabasePool::in_memory().unwrap());

            let err = repo.update_measurement("ghost", 170.0, 70.0, 24.0).await.unwrap_err();
            assert!(matches!(err, RepositoryError::NotFound(_)));

            let err = repo.update_contacts("ghost", Vec::new()).await.unwrap_err();
            assert!(matches!(err, RepositoryError::NotFound(_)));
        }

        #[tokio::test]
        async fn test_in_memory_fallback_without_pool() {
            // No global pool is initialized in unit tests
            let repo = ProfileRepository::new();
            repo.save(profile("u2")).await.unwrap();

            let clone = repo.clone();
            assert!(clone.get_by_user_id("u2").await.unwrap().is_some());
            clone.update_measurement("u2", 180.0, 110.0, 33.95).await.unwrap();
            assert_eq!(repo.get_by_user_id("u2").await.unwrap().unwrap().last_bmi, 33.95);
        }
    }
}
