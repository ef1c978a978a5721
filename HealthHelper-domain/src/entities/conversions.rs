//! Conversions between domain entities and data-layer records.
//! Named `convert_to_[target_layer]_[model]`.

use health_helper_data::models::account::AccountRecord;
use health_helper_data::models::profile::{ContactRecord, ProfileRecord};

use crate::entities::profile::{EmergencyContact, UserIdentity, UserProfile};

pub fn convert_to_domain_identity(account: AccountRecord) -> UserIdentity {
    UserIdentity {
        user_id: account.user_id,
        email: account.email,
        display_name: account.display_name,
    }
}

pub fn convert_to_domain_contact(record: ContactRecord) -> EmergencyContact {
    EmergencyContact {
        id: record.id,
        name: record.name,
        phone_number: record.phone_number,
        relationship: record.relationship,
    }
}

pub fn convert_to_data_contact(contact: &EmergencyContact) -> ContactRecord {
    ContactRecord {
        id: contact.id.clone(),
        name: contact.name.clone(),
        phone_number: contact.phone_number.clone(),
        relationship: contact.relationship.clone(),
    }
}

/// Convert a stored profile to the domain entity
pub fn convert_to_domain_profile(record: ProfileRecord) -> UserProfile {
    UserProfile {
        user_id: record.user_id,
        email: record.email,
        display_name: record.display_name,
        height: record.height,
        weight: record.weight,
        last_bmi: record.last_bmi,
        emergency_contacts: record
            .emergency_contacts
            .into_iter()
            .map(convert_to_domain_contact)
            .collect(),
        health_conditions: record.health_conditions,
    }
}

/// Convert a domain profile to a record; the repository stamps `updated_at`
pub fn convert_to_data_profile(profile: &UserProfile) -> ProfileRecord {
    ProfileRecord {
        user_id: profile.user_id.clone(),
        email: profile.email.clone(),
        display_name: profile.display_name.clone(),
        height: profile.height,
        weight: profile.weight,
        last_bmi: profile.last_bmi,
        emergency_contacts: profile.emergency_contacts.iter().map(convert_to_data_contact).collect(),
        health_conditions: profile.health_conditions.clone(),
        updated_at: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_conversion_keeps_contacts() {
        let profile = UserProfile {
            user_id: "u1".to_string(),
            email: "user@example.com".to_string(),
            last_bmi: 22.5,
            emergency_contacts: vec![EmergencyContact {
                id: "c1".to_string(),
                name: "Mom".to_string(),
                phone_number: "555-0100".to_string(),
                relationship: "Mother".to_string(),
            }],
            ..UserProfile::default()
        };

        let record = convert_to_data_profile(&profile);
        assert_eq!(record.emergency_contacts[0].relationship, "Mother");
        assert_eq!(convert_to_domain_profile(record), profile);
    }
}
