//! Mapping of domain errors onto API error responses

use tracing::{error, warn};
use validator::ValidationErrors;

use health_helper_domain::adapters::AuthError;
use health_helper_domain::auth::{AuthFlowError, SecurityError};
use health_helper_domain::services::validation::{field_messages, summarize};
use health_helper_domain::services::{AlertError, ContactError, MeasurementError, PlacesError};

use crate::entities::common::ErrorResponse;

/// 400 with one message per invalid field
pub fn validation_response(errors: &ValidationErrors) -> ErrorResponse {
    let details = serde_json::to_value(field_messages(errors)).ok();
    ErrorResponse::validation_error(format!("Validation error: {}", summarize(errors)), details)
}

impl From<AuthFlowError> for ErrorResponse {
    fn from(err: AuthFlowError) -> Self {
        match &err {
            AuthFlowError::Validation(errors) => validation_response(errors),
            AuthFlowError::Registration(AuthError::EmailAlreadyInUse) => ErrorResponse::conflict(err.to_string()),
            AuthFlowError::Registration(AuthError::WeakPassword | AuthError::InvalidEmail)
            | AuthFlowError::Login(AuthError::WeakPassword | AuthError::InvalidEmail | AuthError::EmailAlreadyInUse) => {
                ErrorResponse::validation_error(err.to_string(), None)
            },
            AuthFlowError::Login(AuthError::InvalidCredentials) => ErrorResponse::unauthorized(err.to_string()),
            AuthFlowError::Registration(AuthError::Service(_) | AuthError::InvalidCredentials)
            | AuthFlowError::Login(AuthError::Service(_)) => {
                error!("Authentication service failure: {}", err);
                ErrorResponse::service_error(err.to_string())
            }
        }
    }
}

impl From<SecurityError> for ErrorResponse {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::ConfigError(_) | SecurityError::TokenValidation(_) => {
                error!("Could not issue session token: {}", err);
                ErrorResponse::internal_error()
            },
            _ => ErrorResponse::unauthorized(err.to_string()),
        }
    }
}

impl From<MeasurementError> for ErrorResponse {
    fn from(err: MeasurementError) -> Self {
        match &err {
            MeasurementError::Validation(errors) => validation_response(errors),
            MeasurementError::Bmi(_) => ErrorResponse::validation_error(err.to_string(), None),
            MeasurementError::ProfileNotFound(_) => ErrorResponse::not_found("profile"),
            MeasurementError::Store(_) => {
                error!("Measurement not saved: {}", err);
                ErrorResponse::service_error(err.to_string())
            }
        }
    }
}

impl From<ContactError> for ErrorResponse {
    fn from(err: ContactError) -> Self {
        match &err {
            ContactError::Validation(errors) => validation_response(errors),
            ContactError::ContactNotFound(_) => ErrorResponse::not_found("contact"),
            ContactError::ProfileNotFound(_) => ErrorResponse::not_found("profile"),
            ContactError::Store(_) => {
                error!("Contacts not saved: {}", err);
                ErrorResponse::service_error(err.to_string())
            }
        }
    }
}

impl From<AlertError> for ErrorResponse {
    fn from(err: AlertError) -> Self {
        match &err {
            AlertError::NoContacts => ErrorResponse::bad_request(err.to_string()),
            AlertError::Validation(errors) => validation_response(errors),
        }
    }
}

impl From<PlacesError> for ErrorResponse {
    fn from(err: PlacesError) -> Self {
        warn!("Places lookup failed: {}", err);
        ErrorResponse::location_unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::Validate;
    use health_helper_domain::entities::forms::ContactForm;

    #[test]
    fn test_validation_details_per_field() {
        let form = ContactForm {
            name: "  ".to_string(),
            phone_number: "abc123".to_string(),
            relationship: String::new(),
        };
        let response = ErrorResponse::from(ContactError::Validation(form.validate().unwrap_err()));

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let details = response.details.unwrap();
        assert_eq!(details["name"], "Name cannot be empty");
        assert_eq!(details["phone_number"], "Please enter a valid phone number");
    }

    #[test]
    fn test_auth_error_statuses() {
        let conflict = ErrorResponse::from(AuthFlowError::Registration(AuthError::EmailAlreadyInUse));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(conflict.message, "An account already exists with this email.");

        let bad_login = ErrorResponse::from(AuthFlowError::Login(AuthError::InvalidCredentials));
        assert_eq!(bad_login.status_code(), StatusCode::UNAUTHORIZED);

        let outage = ErrorResponse::from(AuthFlowError::Registration(AuthError::Service("down".to_string())));
        assert_eq!(outage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outage.message, "Registration failed: down");
    }

    #[test]
    fn test_sos_without_contacts() {
        let response = ErrorResponse::from(AlertError::NoContacts);
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.message, "Please add at least one emergency contact");
    }
}
