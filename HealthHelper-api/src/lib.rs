// HealthHelper-api lib.rs
//
// HTTP surface of the Community Health Helper: the axum router, its
// handlers and public entities, and the OpenAPI description.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

use axum::Router;
use health_helper_domain::auth::{SecurityError, TokenSettings};

use crate::api::handlers::health::create_health_service;
use crate::api::{Adapters, AppState};
use crate::config::AppConfig;

/// Create the application router with the production adapters
pub fn create_application(config: &AppConfig) -> Result<Router, SecurityError> {
    let tokens = TokenSettings::from_env()?;
    let state = AppState::new(Adapters::from_env(), tokens, config);
    Ok(api::create_app(state, create_health_service()))
}
