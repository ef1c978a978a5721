//! Domain layer health checks

use std::collections::HashMap;
use async_trait::async_trait;
use health_helper_data::database::{self, PoolStatus};

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    Healthy,
    /// Functional with reduced guarantees, e.g. profiles kept only in memory
    Degraded,
    Unhealthy,
}

/// Component health status, ordered from best to worst
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health of a single component
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

impl HealthComponent {
    pub fn healthy() -> Self {
        Self { status: ComponentStatus::Healthy, details: None }
    }

    pub fn with_status(status: ComponentStatus, details: impl Into<String>) -> Self {
        Self { status, details: Some(details.into()) }
    }
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build from components; the overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let worst = components
            .values()
            .map(|c| c.status.clone())
            .max()
            .unwrap_or(ComponentStatus::Healthy);

        let status = match worst {
            ComponentStatus::Healthy => SystemStatus::Healthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    async fn get_system_health(&self) -> SystemHealth;

    /// Ok(true) when the database is healthy, Ok(false) when degraded,
    /// Err when it cannot be reached
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check the global database pool.
///
/// Without a pool, or with an in-memory one, data does not survive a
/// restart, which is reported as degraded rather than unavailable.
pub async fn check_database_status() -> Result<bool, String> {
    database_status(database::get_pool_status())
}

fn database_status(status: Option<PoolStatus>) -> Result<bool, String> {
    match status {
        Some(PoolStatus::Persistent(_)) => Ok(true),
        Some(PoolStatus::InMemory(_)) | None => Ok(false),
        Some(PoolStatus::Unreachable(details)) => Err(details),
    }
}

/// Health service backed by the global database pool
#[derive(Debug, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(true) => HealthComponent::healthy(),
            Ok(false) => HealthComponent::with_status(
                ComponentStatus::Degraded,
                "Using in-memory storage; data will not survive a restart",
            ),
            Err(e) => HealthComponent::with_status(ComponentStatus::Unhealthy, e),
        };

        let mut components = HashMap::new();
        components.insert("database".to_string(), database);
        components.insert("api".to_string(), HealthComponent::healthy());

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_system_health() {
        let health = HealthService::new().get_system_health().await;
        // Status depends on whether a pool was initialized in this process
        assert!(health.components.contains_key("database"));
        assert!(health.components.contains_key("api"));
    }

    #[test]
    fn test_in_memory_database_is_degraded() {
        assert_eq!(database_status(Some(PoolStatus::Persistent("file".into()))), Ok(true));
        assert_eq!(database_status(Some(PoolStatus::InMemory("memory".into()))), Ok(false));
        assert_eq!(database_status(None), Ok(false));
        assert_eq!(
            database_status(Some(PoolStatus::Unreachable("locked".into()))),
            Err("locked".to_string())
        );
    }

    #[test]
    fn test_overall_status_is_worst_component() {
        let mut components = HashMap::new();
        components.insert("api".to_string(), HealthComponent::healthy());
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Healthy);

        components.insert(
            "database".to_string(),
            HealthComponent::with_status(ComponentStatus::Degraded, "in memory"),
        );
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Degraded);

        components.insert(
            "cache".to_string(),
            HealthComponent::with_status(ComponentStatus::Unhealthy, "down"),
        );
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Unhealthy);
    }
}
