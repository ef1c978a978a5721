use serde::{Deserialize, Serialize};

/// Storage model for a registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    /// Unique identifier assigned at registration
    pub user_id: String,

    /// Normalized (trimmed, lowercase) email address
    pub email: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    /// Display name, empty when the user never set one
    pub display_name: String,

    /// RFC 3339 creation time
    pub created_at: String,
}

/// Input data for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Email address as entered by the user
    pub email: String,

    /// Password hash computed by the caller
    pub password_hash: String,

    /// Optional display name
    pub display_name: Option<String>,
}

/// Normalize an email address for lookups and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
