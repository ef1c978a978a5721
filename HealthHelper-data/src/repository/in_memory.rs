use std::sync::{Arc, Mutex};
use std::collections::HashMap;

use crate::models::account::AccountRecord;
use crate::models::profile::{ContactRecord, ProfileRecord};
use super::errors::RepositoryError;

/// In-memory storage for accounts and profiles
///
/// Clones share the same maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Accounts keyed by normalized email
    accounts: Arc<Mutex<HashMap<String, AccountRecord>>>,

    /// Profiles keyed by user id
    profiles: Arc<Mutex<HashMap<String, ProfileRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account, failing if the email is taken
    pub async fn insert_account(&self, account: &AccountRecord) -> Result<(), RepositoryError> {
        let mut store = self.accounts.lock()?;
        if store.contains_key(&account.email) {
            return Err(RepositoryError::Conflict(format!("Account already exists for {}", account.email)));
        }
        store.insert(account.email.clone(), account.clone());
        Ok(())
    }

    /// Find an account by normalized email
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError> {
        let store = self.accounts.lock()?;
        Ok(store.get(email).cloned())
    }

    /// Insert or replace a profile
    pub async fn upsert_profile(&self, profile: &ProfileRecord) -> Result<(), RepositoryError> {
        let mut store = self.profiles.lock()?;
        store.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    /// Get a profile by user id
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        let store = self.profiles.lock()?;
        Ok(store.get(user_id).cloned())
    }

    /// Overwrite the measurement fields of an existing profile
    pub async fn update_measurement(
        &self,
        user_id: &str,
        height: f64,
        weight: f64,
        bmi: f64,
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        let mut store = self.profiles.lock()?;
        match store.get_mut(user_id) {
            Some(profile) => {
                profile.height = height;
                profile.weight = weight;
                profile.last_bmi = bmi;
                profile.updated_at = updated_at.to_string();
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Replace the contact list of an existing profile
    pub async fn update_contacts(
        &self,
        user_id: &str,
        contacts: &[ContactRecord],
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        let mut store = self.profiles.lock()?;
        match store.get_mut(user_id) {
            Some(profile) => {
                profile.emergency_contacts = contacts.to_vec();
                profile.updated_at = updated_at.to_string();
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
