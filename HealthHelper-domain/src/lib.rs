// HealthHelper Domain
// Business logic for the Community Health Helper application

// Collaborator contracts and their local implementations
pub mod adapters;

// Registration, login and session tokens
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Flows built on the adapters
pub mod services;

// Per-session state
pub mod session;

// Re-export the database module from the data layer for convenience
pub use health_helper_data::database;

// Testing utilities - available to tests and with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
