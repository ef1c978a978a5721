use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_helper_domain::auth::{AuthOutcome, IssuedToken, ProfileStatus};
use health_helper_domain::entities::profile::{UserIdentity, UserProfile};
use health_helper_domain::session::{AuthState, Session};

/// Returned by register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the new session
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: String,

    pub expires_at: DateTime<Utc>,

    pub user: UserIdentity,

    /// Absent when the profile could not be read or written
    pub profile: Option<UserProfile>,

    /// created, loaded, failed or timed_out
    pub profile_status: String,

    /// Shown to the user when the profile step did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl AuthResponse {
    pub fn new(token: IssuedToken, outcome: AuthOutcome) -> Self {
        let (profile_status, notice) = match &outcome.profile_status {
            ProfileStatus::Created => ("created", None),
            ProfileStatus::Loaded => ("loaded", None),
            ProfileStatus::Failed(_) => ("failed", Some("Your profile could not be saved. It will be created on your next login.")),
            ProfileStatus::TimedOut => ("timed_out", Some("Your profile is taking longer than usual to save.")),
        };

        Self {
            access_token: token.token,
            token_type: "Bearer".to_string(),
            expires_at: token.expires_at,
            user: outcome.identity,
            profile: outcome.profile,
            profile_status: profile_status.to_string(),
            notice: notice.map(String::from),
        }
    }
}

/// State of the caller's session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: String,
    pub user: UserIdentity,
    pub profile: Option<UserProfile>,

    /// Status of the last flow, `{"status": "...", "message": "..."}`
    #[schema(value_type = Object)]
    pub auth_state: AuthState,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            user: session.identity,
            profile: session.profile,
            auth_state: session.auth_state,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}
