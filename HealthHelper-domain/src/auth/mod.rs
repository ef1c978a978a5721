//! Authentication for the HealthHelper API
//!
//! Registration and login flows, session token signing, and structured
//! authentication event logging.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod flow;
pub mod logging;
pub mod token;

pub use flow::{AuthFlowError, AuthOutcome, AuthService, ProfileStatus};
pub use token::{generate_token, validate_token, IssuedToken, SecurityError, TokenSettings};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token id, also the session key
    pub jti: String,
}
