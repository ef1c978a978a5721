use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use health_helper_domain::health::{
    ComponentStatus, HealthComponent, HealthService, HealthServiceTrait, SystemStatus,
};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    /// Crate version
    pub version: String,
    /// Unix time the response was generated
    pub timestamp: u64,
    /// Seconds since the server started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Status of each component by name
    pub components: BTreeMap<String, ComponentHealth>,
    pub environment: String,
}

/// Health of one component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// "ok", "degraded" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting; later calls are no-ops
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.set(unix_now());
}

/// Health service handed to the health route
pub fn create_health_service() -> Arc<dyn HealthServiceTrait + Send + Sync> {
    Arc::new(HealthService::new())
}

fn status_label(status: &ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "ok",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "error",
    }
}

fn component_health(component: &HealthComponent) -> ComponentHealth {
    ComponentHealth {
        status: status_label(&component.status).to_string(),
        message: component.details.clone(),
    }
}

/// Report service health.
///
/// Running on in-memory storage is reported as degraded but still answers
/// 200, since every feature keeps working for the life of the process.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy or degraded", body = HealthResponse),
        (status = 503, description = "API is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip_all)]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait + Send + Sync>>,
) -> impl IntoResponse {
    let now = unix_now();
    let system_health = health_service.get_system_health().await;

    let status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };
    debug!("Health check: {}", status);

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|start| now.saturating_sub(*start)),
        components: system_health
            .components
            .iter()
            .map(|(name, component)| (name.clone(), component_health(component)))
            .collect(),
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    let code = match system_health.status {
        SystemStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use health_helper_domain::testing::MockHealthService;
    use tower::ServiceExt;

    async fn call(service: MockHealthService) -> (StatusCode, serde_json::Value) {
        let health_service: Arc<dyn HealthServiceTrait + Send + Sync> = Arc::new(service);
        let app = Router::new()
            .route("/health", get(health_check))
            .layer(Extension(health_service));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_healthy() {
        let (status, body) = call(MockHealthService::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["components"]["database"]["status"], "ok");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_unhealthy_database() {
        let (status, body) = call(MockHealthService::new().with_unhealthy_database()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
        assert_eq!(body["components"]["database"]["message"], "Database connection failed");
    }
}
