use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{instrument, warn};

use health_helper_domain::entities::forms::ContactForm;
use health_helper_domain::entities::profile::EmergencyContact;
use health_helper_domain::session::FlowTicket;

use crate::api::handlers::flow::{fail_flow, start_flow};
use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Mirror the stored contact list into the session's profile copy
async fn refresh_session_contacts(state: &AppState, session: &CurrentSession, ticket: &FlowTicket) {
    match state.contacts.list(session.user_id()).await {
        Ok(contacts) => {
            state.sessions.complete_flow(ticket, move |current| {
                if let Some(profile) = current.profile.as_mut() {
                    profile.emergency_contacts = contacts;
                }
            });
        },
        // The write itself succeeded; only the session copy is left stale
        Err(e) => {
            state.sessions.complete_flow(ticket, |_| {});
            warn!("Could not refresh contacts for session {}: {}", session.session_id(), e);
        }
    }
}

/// List the caller's emergency contacts
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    responses(
        (status = 200, description = "Emergency contacts", body = [EmergencyContact]),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<Vec<EmergencyContact>>, ErrorResponse> {
    Ok(Json(state.contacts.list(session.user_id()).await?))
}

/// Add an emergency contact
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = ContactForm,
    responses(
        (status = 201, description = "Contact added", body = EmergencyContact),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(form): Json<ContactForm>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let ticket = start_flow(&state, &session)?;
    let contact = state
        .contacts
        .add(session.user_id(), &form)
        .await
        .map_err(|e| fail_flow(&state, &ticket, e))?;
    refresh_session_contacts(&state, &session, &ticket).await;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Replace the fields of an emergency contact
#[utoipa::path(
    put,
    path = "/api/v1/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    request_body = ContactForm,
    responses(
        (status = 200, description = "Contact updated", body = EmergencyContact),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
#[instrument(skip_all, fields(user_id = %session.user_id(), contact_id = %id))]
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
    Json(form): Json<ContactForm>,
) -> Result<Json<EmergencyContact>, ErrorResponse> {
    let ticket = start_flow(&state, &session)?;
    let contact = state
        .contacts
        .update(session.user_id(), &id, &form)
        .await
        .map_err(|e| fail_flow(&state, &ticket, e))?;
    refresh_session_contacts(&state, &session, &ticket).await;
    Ok(Json(contact))
}

/// Delete an emergency contact
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 404, description = "Contact not found", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
#[instrument(skip_all, fields(user_id = %session.user_id(), contact_id = %id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    let ticket = start_flow(&state, &session)?;
    state
        .contacts
        .remove(session.user_id(), &id)
        .await
        .map_err(|e| fail_flow(&state, &ticket, e))?;
    refresh_session_contacts(&state, &session, &ticket).await;
    Ok(StatusCode::NO_CONTENT)
}
