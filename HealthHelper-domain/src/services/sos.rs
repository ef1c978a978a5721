use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::adapters::{LocationAdapter, MessagingAdapter};
use crate::entities::forms::EmergencyMessageForm;
use crate::entities::places::GeoPosition;
use crate::entities::profile::EmergencyContact;
use crate::services::validation::summarize;

/// Message used when the user has not written their own
pub const DEFAULT_EMERGENCY_MESSAGE: &str = "This is an emergency. I need help at my current location.";

/// Errors that stop an alert before any message is composed
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Please add at least one emergency contact")]
    NoContacts,

    #[error("Validation error: {}", summarize(.0))]
    Validation(ValidationErrors),
}

/// Handoff outcome for one contact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ContactDispatch {
    pub contact_id: String,
    pub contact_name: String,
    pub phone_number: String,
    pub handed_off: bool,
    /// User-visible notice when the handoff failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Outcome of an SOS alert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AlertReport {
    /// Exact text handed to the messaging service
    pub text: String,
    pub location: Option<GeoPosition>,
    pub dispatches: Vec<ContactDispatch>,
}

impl AlertReport {
    pub fn location_included(&self) -> bool {
        self.location.is_some()
    }

    pub fn handed_off_count(&self) -> usize {
        self.dispatches.iter().filter(|d| d.handed_off).count()
    }

    /// Notices for every failed handoff
    pub fn notices(&self) -> Vec<String> {
        self.dispatches.iter().filter_map(|d| d.notice.clone()).collect()
    }
}

/// Append the map link to the message when a position is known
pub fn compose_alert_text(message: &str, location: Option<GeoPosition>) -> String {
    match location {
        Some(position) => format!("{}\nMy location: {}", message, position.maps_link()),
        None => message.to_string(),
    }
}

/// SOS alert dispatch
pub struct EmergencyAlertService {
    location: Arc<dyn LocationAdapter>,
    messaging: Arc<dyn MessagingAdapter>,
}

impl EmergencyAlertService {
    pub fn new(location: Arc<dyn LocationAdapter>, messaging: Arc<dyn MessagingAdapter>) -> Self {
        Self { location, messaging }
    }

    /// Hand the alert to the messaging service once per contact.
    ///
    /// A missing location only drops the map link, and a failed handoff only
    /// affects that contact.
    #[instrument(skip(self, contacts, form), fields(contacts = contacts.len()))]
    pub async fn send_alert(
        &self,
        contacts: &[EmergencyContact],
        form: &EmergencyMessageForm,
    ) -> Result<AlertReport, AlertError> {
        if contacts.is_empty() {
            return Err(AlertError::NoContacts);
        }
        form.validate().map_err(AlertError::Validation)?;

        let location = match self.location.current_position().await {
            Ok(position) => Some(position),
            Err(e) => {
                warn!("Sending alert without location: {}", e);
                None
            }
        };
        let text = compose_alert_text(&form.message, location);

        let mut dispatches = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let outcome = self.messaging.compose_message(&contact.phone_number, &text).await;
            let notice = match outcome {
                Ok(()) => {
                    info!("Alert handed off for contact {}", contact.id);
                    None
                },
                Err(e) => {
                    warn!("Alert handoff failed for contact {}: {}", contact.id, e);
                    Some(format!("Unable to send message to {}", contact.name))
                }
            };
            dispatches.push(ContactDispatch {
                contact_id: contact.id.clone(),
                contact_name: contact.name.clone(),
                phone_number: contact.phone_number.clone(),
                handed_off: notice.is_none(),
                notice,
            });
        }

        let report = AlertReport { text, location, dispatches };
        info!(
            "Alert dispatched to {}/{} contacts (location included: {})",
            report.handed_off_count(),
            contacts.len(),
            report.location_included()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockLocation, RecordingMessaging};

    fn contact(id: &str, name: &str, phone: &str) -> EmergencyContact {
        EmergencyContact {
            id: id.to_string(),
            name: name.to_string(),
            phone_number: phone.to_string(),
            relationship: String::new(),
        }
    }

    fn message() -> EmergencyMessageForm {
        EmergencyMessageForm { message: DEFAULT_EMERGENCY_MESSAGE.to_string() }
    }

    #[tokio::test]
    async fn test_alert_includes_location_link() {
        let messaging = Arc::new(RecordingMessaging::new());
        let service = EmergencyAlertService::new(
            Arc::new(MockLocation::at(40.0, -74.0)),
            messaging.clone(),
        );

        let report = service
            .send_alert(&[contact("1", "Emergency Services", "911")], &message())
            .await
            .unwrap();

        let expected = format!(
            "{}\nMy location: https://maps.google.com/?q=40,-74",
            DEFAULT_EMERGENCY_MESSAGE
        );
        assert_eq!(report.text, expected);
        assert_eq!(messaging.sent(), vec![("911".to_string(), expected)]);
    }

    #[tokio::test]
    async fn test_alert_without_location_omits_link() {
        let messaging = Arc::new(RecordingMessaging::new());
        let service = EmergencyAlertService::new(Arc::new(MockLocation::unavailable()), messaging.clone());

        let report = service
            .send_alert(&[contact("1", "Mom", "555-0100")], &message())
            .await
            .unwrap();

        assert!(!report.location_included());
        assert_eq!(report.text, DEFAULT_EMERGENCY_MESSAGE);
        assert!(!messaging.sent()[0].1.contains("My location"));
    }

    #[tokio::test]
    async fn test_failed_contact_does_not_stop_others() {
        let messaging = Arc::new(RecordingMessaging::failing_for(&["555-0101"]));
        let service = EmergencyAlertService::new(Arc::new(MockLocation::unavailable()), messaging.clone());

        let contacts = vec![
            contact("1", "Mom", "555-0100"),
            contact("2", "Dad", "555-0101"),
            contact("3", "Sis", "555-0102"),
        ];
        let report = service.send_alert(&contacts, &message()).await.unwrap();

        assert_eq!(report.handed_off_count(), 2);
        assert_eq!(report.notices(), vec!["Unable to send message to Dad".to_string()]);
        let phones: Vec<String> = messaging.sent().into_iter().map(|(phone, _)| phone).collect();
        assert_eq!(phones, vec!["555-0100".to_string(), "555-0102".to_string()]);
    }

    #[tokio::test]
    async fn test_no_contacts() {
        let service = EmergencyAlertService::new(
            Arc::new(MockLocation::unavailable()),
            Arc::new(RecordingMessaging::new()),
        );
        let err = service.send_alert(&[], &message()).await.unwrap_err();
        assert_eq!(err.to_string(), "Please add at least one emergency contact");
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let service = EmergencyAlertService::new(
            Arc::new(MockLocation::unavailable()),
            Arc::new(RecordingMessaging::new()),
        );
        let form = EmergencyMessageForm { message: "  ".to_string() };
        let err = service.send_alert(&[contact("1", "Mom", "1")], &form).await.unwrap_err();
        assert!(matches!(err, AlertError::Validation(_)));
    }
}
