use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::adapters::{ProfileStoreAdapter, StoreError};
use crate::entities::forms::ContactForm;
use crate::entities::profile::EmergencyContact;
use crate::services::validation::summarize;

/// Errors from editing the emergency contact list
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Validation error: {}", summarize(.0))]
    Validation(ValidationErrors),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Could not save your contacts: {0}")]
    Store(String),
}

/// Emergency contact editing.
///
/// Every change reads the current list, edits it and writes the whole list
/// back; concurrent edits resolve last-write-wins.
pub struct ContactService {
    store: Arc<dyn ProfileStoreAdapter>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ProfileStoreAdapter>) -> Self {
        Self { store }
    }

    fn map_store_error(err: StoreError) -> ContactError {
        match err {
            StoreError::NotFound(msg) => ContactError::ProfileNotFound(msg),
            StoreError::Backend(msg) => {
                error!("Contact store failure: {}", msg);
                ContactError::Store(msg)
            }
        }
    }

    fn build_contact(id: String, form: &ContactForm) -> EmergencyContact {
        EmergencyContact {
            id,
            name: form.name.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
            relationship: form.relationship.trim().to_string(),
        }
    }

    /// Current contact list
    pub async fn list(&self, user_id: &str) -> Result<Vec<EmergencyContact>, ContactError> {
        self.store.get_contacts(user_id).await.map_err(Self::map_store_error)
    }

    /// Append a new contact
    pub async fn add(&self, user_id: &str, form: &ContactForm) -> Result<EmergencyContact, ContactError> {
        form.validate().map_err(ContactError::Validation)?;

        let mut contacts = self.list(user_id).await?;
        let contact = Self::build_contact(Uuid::new_v4().to_string(), form);
        contacts.push(contact.clone());

        self.store.save_contacts(user_id, &contacts).await.map_err(Self::map_store_error)?;
        info!("Added emergency contact {} for user {}", contact.id, user_id);
        Ok(contact)
    }

    /// Replace the fields of an existing contact, keeping its id
    pub async fn update(&self, user_id: &str, contact_id: &str, form: &ContactForm) -> Result<EmergencyContact, ContactError> {
        form.validate().map_err(ContactError::Validation)?;

        let mut contacts = self.list(user_id).await?;
        let slot = contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or_else(|| ContactError::ContactNotFound(contact_id.to_string()))?;
        *slot = Self::build_contact(contact_id.to_string(), form);
        let updated = slot.clone();

        self.store.save_contacts(user_id, &contacts).await.map_err(Self::map_store_error)?;
        info!("Updated emergency contact {} for user {}", contact_id, user_id);
        Ok(updated)
    }

    /// Delete a contact by id
    pub async fn remove(&self, user_id: &str, contact_id: &str) -> Result<(), ContactError> {
        let mut contacts = self.list(user_id).await?;
        let before = contacts.len();
        contacts.retain(|c| c.id != contact_id);
        if contacts.len() == before {
            return Err(ContactError::ContactNotFound(contact_id.to_string()));
        }

        self.store.save_contacts(user_id, &contacts).await.map_err(Self::map_store_error)?;
        info!("Removed emergency contact {} for user {}", contact_id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::profile::UserProfile;
    use crate::testing::MockProfileStore;

    fn service_with_profile() -> (ContactService, Arc<MockProfileStore>) {
        let store = Arc::new(MockProfileStore::new());
        store.insert(UserProfile { user_id: "u1".to_string(), ..UserProfile::default() });
        (ContactService::new(store.clone()), store)
    }

    fn form(name: &str, phone: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            phone_number: phone.to_string(),
            relationship: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_edit_delete_persist() {
        let (service, store) = service_with_profile();

        let mom = service.add("u1", &form(" Mom ", "555-0100")).await.unwrap();
        let dad = service.add("u1", &form("Dad", "555-0101")).await.unwrap();
        assert_ne!(mom.id, dad.id);
        assert_eq!(mom.name, "Mom");

        let edited = service.update("u1", &mom.id, &form("Mother", "+1 555 0100")).await.unwrap();
        assert_eq!(edited.id, mom.id);

        service.remove("u1", &dad.id).await.unwrap();

        let stored = store.get_contacts("u1").await.unwrap();
        assert_eq!(stored, vec![edited]);
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_saved() {
        let (service, store) = service_with_profile();
        let err = service.add("u1", &form("", "abc123")).await.unwrap_err();
        assert!(matches!(err, ContactError::Validation(_)));
        assert!(store.get_contacts("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_contact() {
        let (service, _) = service_with_profile();
        assert!(matches!(
            service.update("u1", "missing", &form("A", "1")).await,
            Err(ContactError::ContactNotFound(_))
        ));
        assert!(matches!(service.remove("u1", "missing").await, Err(ContactError::ContactNotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure() {
        let service = ContactService::new(Arc::new(MockProfileStore::failing()));
        assert!(matches!(service.list("u1").await, Err(ContactError::Store(_))));
    }
}
