//! Field predicates shared by every input form.
//!
//! Each check returns `Ok(())` or the [`FieldIssue`] that explains the
//! failure. Forms compose these into `validator::ValidationErrors` so a
//! submission can report every failing field at once.

use std::borrow::Cow;
use std::collections::BTreeMap;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern is a valid regex")
});

/// Why a field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    EmptyEmail,
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort,
    EmptyConfirmation,
    PasswordMismatch,
    EmptyName,
    EmptyPhone,
    InvalidPhone,
    EmptyMessage,
}

impl FieldIssue {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            FieldIssue::EmptyEmail
            | FieldIssue::EmptyPassword
            | FieldIssue::EmptyConfirmation
            | FieldIssue::EmptyName
            | FieldIssue::EmptyPhone
            | FieldIssue::EmptyMessage => "required",
            FieldIssue::InvalidEmail => "email",
            FieldIssue::PasswordTooShort => "length",
            FieldIssue::PasswordMismatch => "must_match",
            FieldIssue::InvalidPhone => "phone",
        }
    }

    /// Message shown next to the field
    pub fn message(&self) -> &'static str {
        match self {
            FieldIssue::EmptyEmail => "Email cannot be empty",
            FieldIssue::InvalidEmail => "Please enter a valid email address",
            FieldIssue::EmptyPassword => "Password cannot be empty",
            FieldIssue::PasswordTooShort => "Password must be at least 6 characters",
            FieldIssue::EmptyConfirmation => "Please confirm your password",
            FieldIssue::PasswordMismatch => "Passwords do not match",
            FieldIssue::EmptyName => "Name cannot be empty",
            FieldIssue::EmptyPhone => "Phone number cannot be empty",
            FieldIssue::InvalidPhone => "Please enter a valid phone number",
            FieldIssue::EmptyMessage => "Message cannot be empty",
        }
    }

    fn to_validation_error(self) -> ValidationError {
        let mut error = ValidationError::new(self.code());
        error.message = Some(Cow::Borrowed(self.message()));
        error
    }
}

/// Result of a single field check
pub type FieldCheck = Result<(), FieldIssue>;

/// Email must be present and look like an address
pub fn check_email(email: &str) -> FieldCheck {
    if email.is_empty() {
        Err(FieldIssue::EmptyEmail)
    } else if !EMAIL_PATTERN.is_match(email) {
        Err(FieldIssue::InvalidEmail)
    } else {
        Ok(())
    }
}

/// Password must be present and at least six characters long
pub fn check_password(password: &str) -> FieldCheck {
    if password.is_empty() {
        Err(FieldIssue::EmptyPassword)
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        Err(FieldIssue::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Login only requires the password to be present
pub fn check_password_present(password: &str) -> FieldCheck {
    if password.is_empty() {
        Err(FieldIssue::EmptyPassword)
    } else {
        Ok(())
    }
}

/// Confirmation must be present and equal to the password
pub fn check_password_confirmation(password: &str, confirmation: &str) -> FieldCheck {
    if confirmation.is_empty() {
        Err(FieldIssue::EmptyConfirmation)
    } else if password != confirmation {
        Err(FieldIssue::PasswordMismatch)
    } else {
        Ok(())
    }
}

/// Phone must be non-blank and use only digits, spaces and `+-()`
pub fn check_phone_number(phone: &str) -> FieldCheck {
    if phone.trim().is_empty() {
        Err(FieldIssue::EmptyPhone)
    } else if !phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ')) {
        Err(FieldIssue::InvalidPhone)
    } else {
        Ok(())
    }
}

/// Free text must contain something other than whitespace
pub fn check_not_blank(value: &str, issue: FieldIssue) -> FieldCheck {
    if value.trim().is_empty() {
        Err(issue)
    } else {
        Ok(())
    }
}

/// Record a failed check against `field`
pub(crate) fn record(errors: &mut ValidationErrors, field: &'static str, check: FieldCheck) {
    if let Err(issue) = check {
        errors.add(field, issue.to_validation_error());
    }
}

/// First message for every failing field, keyed by field name
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Flatten validation errors into `field: message; ...`, ordered by field
pub fn summarize(errors: &ValidationErrors) -> String {
    field_messages(errors)
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<String>>()
        .join("; ")
}
