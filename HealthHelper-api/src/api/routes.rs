use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use health_helper_domain::health::HealthServiceTrait;

use crate::api::handlers::{auth, bmi, contacts, health, places, profile, sos};
use crate::api::middleware::require_session;
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Build the application router
pub fn create_app(state: AppState, health_service: Arc<dyn HealthServiceTrait + Send + Sync>) -> Router {
    // Routes that need an open session
    let api_routes = Router::new()
        .route("/bmi/evaluate", post(bmi::evaluate_bmi))
        .route("/bmi/categories", get(bmi::bmi_categories))
        .route("/bmi", post(bmi::commit_bmi))
        .route("/profile", get(profile::get_profile))
        .route("/contacts", get(contacts::list_contacts).post(contacts::add_contact))
        .route("/contacts/:id", put(contacts::update_contact).delete(contacts::delete_contact))
        .route("/sos", post(sos::send_sos))
        .route("/places", get(places::nearby_places))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let session_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::current_session))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .layer(Extension(health_service));

    debug!("Routes configured");

    let app = Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
        .merge(configure_swagger_routes());

    health::initialize_server_start_time();
    apply_common_layers(app)
}

/// CORS, security headers and request tracing
fn apply_common_layers(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    app.layer(security_headers)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::Adapters;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use health_helper_domain::adapters::{CatalogPlacesAdapter, SmsIntentAdapter};
    use health_helper_domain::auth::TokenSettings;
    use health_helper_domain::testing::{MockAuthAdapter, MockHealthService, MockLocation, MockProfileStore};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let adapters = Adapters {
            auth: Arc::new(MockAuthAdapter::new()),
            profiles: Arc::new(MockProfileStore::new()),
            location: Arc::new(MockLocation::unavailable()),
            messaging: Arc::new(SmsIntentAdapter::new()),
            places: Arc::new(CatalogPlacesAdapter::new()),
        };
        let tokens = TokenSettings::new("route-test-secret", "health-helper-tests", 1);
        let state = AppState::new(adapters, tokens, &AppConfig::default());
        create_app(state, Arc::new(MockHealthService::new()))
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_session_routes_require_token() {
        let response = test_app()
            .oneshot(Request::builder().uri("/auth/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
