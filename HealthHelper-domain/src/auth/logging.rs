//! `AUTH-LOG` audit lines for registration, login, logout and bearer checks.
//!
//! Successful events go out at `info`, failures at `warn`, so a deployment
//! can keep failed sign-ins while filtering the rest.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventType {
    Registration,
    /// Initial profile write that follows a registration
    ProfileCreation,
    Login,
    FailedLogin,
    Logout,
    /// Bearer check performed by the session middleware
    TokenValidation,
}

impl AuthEventType {
    fn label(self) -> &'static str {
        match self {
            Self::Registration => "REGISTRATION",
            Self::ProfileCreation => "PROFILE_CREATION",
            Self::Login => "LOGIN",
            Self::FailedLogin => "FAILED_LOGIN",
            Self::Logout => "LOGOUT",
            Self::TokenValidation => "TOKEN_VALIDATION",
        }
    }
}

impl fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One audit record. `subject` is a user id once known, otherwise the
/// email that was submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    pub subject: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub method: Option<String>,
    pub duration_ms: Option<u64>,
    pub details: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, subject: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            subject: subject.map(str::to_owned),
            timestamp: Utc::now(),
            success,
            method: None,
            duration_ms: None,
            details: None,
        }
    }

    pub fn method(self, method: &str) -> Self {
        Self { method: Some(method.to_owned()), ..self }
    }

    pub fn took(self, duration_ms: u64) -> Self {
        Self { duration_ms: Some(duration_ms), ..self }
    }

    pub fn detail(self, details: Option<&str>) -> Self {
        Self { details: details.map(str::to_owned), ..self }
    }

    pub fn emit(&self) {
        if self.success {
            info!("{}", self);
        } else {
            warn!("{}", self);
        }
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AUTH-LOG [{}] [{}] [{}] [{}]",
            self.event_type,
            self.subject.as_deref().unwrap_or("anonymous"),
            if self.success { "SUCCESS" } else { "FAILURE" },
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        if let Some(method) = &self.method {
            write!(f, " method={}", method)?;
        }
        if let Some(ms) = self.duration_ms {
            write!(f, " duration_ms={}", ms)?;
        }
        if let Some(details) = &self.details {
            write!(f, " {}", details)?;
        }
        Ok(())
    }
}

pub fn log_registration(subject: &str, success: bool, details: Option<&str>) {
    AuthEvent::new(AuthEventType::Registration, Some(subject), success)
        .method("password")
        .detail(details)
        .emit();
}

/// Profile creation failures are logged but never fail the registration
pub fn log_profile_creation(user_id: &str, success: bool, details: &str, duration_ms: u64) {
    AuthEvent::new(AuthEventType::ProfileCreation, Some(user_id), success)
        .took(duration_ms)
        .detail(Some(details))
        .emit();
}

pub fn log_successful_login(user_id: &str) {
    AuthEvent::new(AuthEventType::Login, Some(user_id), true).method("password").emit();
}

pub fn log_failed_login(email: &str, reason: &str) {
    AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .method("password")
        .detail(Some(reason))
        .emit();
}

pub fn log_logout(user_id: &str) {
    AuthEvent::new(AuthEventType::Logout, Some(user_id), true).emit();
}

pub fn log_token_validation(subject: Option<&str>, success: bool, details: Option<&str>) {
    AuthEvent::new(AuthEventType::TokenValidation, subject, success)
        .method("bearer")
        .detail(details)
        .emit();
}
