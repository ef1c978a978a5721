use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{debug, info, instrument};

use health_helper_domain::auth::{generate_token, AuthOutcome};
use health_helper_domain::entities::forms::{LoginForm, RegisterForm};

use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::auth::{AuthResponse, SessionResponse};
use crate::entities::common::{ErrorResponse, MessageResponse};

/// Issue a token for a completed flow and open its session
fn open_session(state: &AppState, outcome: AuthOutcome) -> Result<AuthResponse, ErrorResponse> {
    let token = generate_token(&state.tokens, &outcome.identity.user_id)?;
    let purged = state.sessions.purge_expired();
    if purged > 0 {
        debug!("Purged {} expired sessions", purged);
    }
    state.sessions.open(
        &token.token_id,
        outcome.identity.clone(),
        outcome.profile.clone(),
        token.expires_at,
    );
    Ok(AuthResponse::new(token, outcome))
}

/// Create an account and sign in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Identity service failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcome = state.auth.register(&form).await?;
    let response = open_session(&state, outcome)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<AuthResponse>, ErrorResponse> {
    let outcome = state.auth.login(&form).await?;
    Ok(Json(open_session(&state, outcome)?))
}

/// End the current session; its token stops working immediately
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Json<MessageResponse> {
    state.sessions.close(session.session_id());
    state.auth.sign_out(session.user_id()).await;
    info!("Closed session {}", session.session_id());
    Json(MessageResponse::new("Signed out"))
}

/// Current session, including the cached profile and last flow status
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn current_session(Extension(session): Extension<CurrentSession>) -> Json<SessionResponse> {
    Json(SessionResponse::from(session.0))
}
