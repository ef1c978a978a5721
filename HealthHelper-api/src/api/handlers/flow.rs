//! Session bookkeeping shared by handlers that change session state

use health_helper_domain::auth::SecurityError;
use health_helper_domain::session::FlowTicket;

use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Mark the caller's session as loading and take a ticket for the result
pub(crate) fn start_flow(state: &AppState, session: &CurrentSession) -> Result<FlowTicket, ErrorResponse> {
    state
        .sessions
        .begin_flow(session.session_id())
        .ok_or_else(|| SecurityError::TokenRevoked.into())
}

/// Record a failed flow on the session and hand back the response to send
pub(crate) fn fail_flow(state: &AppState, ticket: &FlowTicket, err: impl Into<ErrorResponse>) -> ErrorResponse {
    let response = err.into();
    state.sessions.fail_flow(ticket, response.message.clone());
    response
}
