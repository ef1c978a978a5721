use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use health_helper_domain::auth::logging::log_token_validation;
use health_helper_domain::auth::{validate_token, SecurityError};
use health_helper_domain::session::Session;

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// The open session behind the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl CurrentSession {
    pub fn user_id(&self) -> &str {
        self.0.user_id()
    }

    pub fn session_id(&self) -> &str {
        &self.0.session_id
    }
}

/// Token from an `Authorization` value; the scheme name is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn reject(subject: Option<&str>, reason: &str) -> Response {
    log_token_validation(subject, false, Some(reason));
    ErrorResponse::unauthorized(reason).into_response()
}

/// Require a bearer token whose session is still open.
///
/// The token must verify, and its `jti` must name an open session owned by
/// the token's subject; signed-out and expired sessions are rejected.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match req.headers().get(header::AUTHORIZATION).map(|v| v.to_str()) {
        Some(Ok(value)) => match bearer_token(value) {
            Some(token) => token.to_string(),
            None => {
                warn!("Authorization header does not contain Bearer token");
                return reject(None, "Authorization header does not contain Bearer token");
            }
        },
        Some(Err(_)) => return reject(None, "Invalid Authorization header format"),
        None => {
            debug!("Missing Authorization header on {}", req.uri().path());
            return reject(None, "Missing Authorization header");
        }
    };

    let claims = match validate_token(&state.tokens, &token) {
        Ok(claims) => claims,
        Err(e) => return reject(None, &e.to_string()),
    };

    let session = match state.sessions.get(&claims.jti) {
        Some(session) if session.user_id() == claims.sub => session,
        Some(_) => return reject(Some(&claims.sub), "Session does not belong to token subject"),
        None => return reject(Some(&claims.sub), &SecurityError::TokenRevoked.to_string()),
    };

    log_token_validation(Some(&claims.sub), true, None);
    req.extensions_mut().insert(CurrentSession(session));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("BEARER   abc.def "), Some("abc.def"));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Bearerabc"), None);
    }
}
