use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{info, instrument, warn};

use health_helper_domain::entities::forms::EmergencyMessageForm;

use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::sos::{SosRequest, SosResponse};

/// Send an SOS alert to every emergency contact.
///
/// Partial failures still answer 200; the response lists which contacts
/// could not be messaged.
#[utoipa::path(
    post,
    path = "/api/v1/sos",
    request_body = SosRequest,
    responses(
        (status = 200, description = "Alert handed off", body = SosResponse),
        (status = 400, description = "No contacts or empty message", body = ErrorResponse),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "sos"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn send_sos(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(request): Json<SosRequest>,
) -> Result<Json<SosResponse>, ErrorResponse> {
    let contacts = state.contacts.list(session.user_id()).await?;
    let form = EmergencyMessageForm {
        message: request
            .message
            .unwrap_or_else(|| state.default_emergency_message.clone()),
    };

    let report = state.alerts.send_alert(&contacts, &form).await?;
    let response = SosResponse::from(report);

    if response.notices.is_empty() {
        info!("SOS handed off to {} contacts", response.handed_off);
    } else {
        warn!(
            "SOS handed off to {} of {} contacts",
            response.handed_off,
            response.dispatches.len()
        );
    }
    Ok(Json(response))
}
