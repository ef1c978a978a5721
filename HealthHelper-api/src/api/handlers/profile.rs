use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{info, instrument};

use health_helper_domain::adapters::StoreError;

use crate::api::handlers::flow::{fail_flow, start_flow};
use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::profile::ProfileResponse;

/// The caller's stored profile.
///
/// Reads the store rather than the session copy, and refreshes the session
/// with what it finds.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Stored profile", body = ProfileResponse),
        (status = 401, description = "Session has ended", body = ErrorResponse),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<ProfileResponse>, ErrorResponse> {
    let ticket = start_flow(&state, &session)?;

    let profile = match state.profiles.get_profile(session.user_id()).await {
        Ok(profile) => profile,
        Err(StoreError::NotFound(_)) => {
            info!("No profile stored for user {}", session.user_id());
            return Err(fail_flow(&state, &ticket, ErrorResponse::not_found("profile")));
        },
        Err(StoreError::Backend(msg)) => {
            let response = ErrorResponse::service_error(format!("Could not load your profile: {}", msg));
            return Err(fail_flow(&state, &ticket, response));
        }
    };

    let snapshot = profile.clone();
    state.sessions.complete_flow(&ticket, move |current| current.profile = Some(snapshot));

    Ok(Json(ProfileResponse::from(profile)))
}
