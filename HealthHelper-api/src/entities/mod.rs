// Public entities for the Community Health Helper API
// Request and response shapes that exist only at the HTTP boundary; domain
// entities are reused directly where their shape already fits

pub mod auth;
pub mod bmi;

// Common entities for error handling
pub mod common;

pub mod places;
pub mod profile;
pub mod sos;
