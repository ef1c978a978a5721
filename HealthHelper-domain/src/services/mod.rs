// Domain services
// Business flows built on the adapters; each flow catches collaborator
// failures at its boundary and returns a typed error.
pub mod bmi;
pub mod contacts;
pub mod measurement;
pub mod places;
pub mod sos;
pub mod validation;

// Re-export service types
pub use bmi::{calculate_bmi, categorize_bmi, evaluate, BmiError};
pub use contacts::{ContactError, ContactService};
pub use measurement::{MeasurementError, MeasurementService};
pub use places::{NearbyPlaces, PlacesError, PlacesService};
pub use sos::{AlertError, AlertReport, ContactDispatch, EmergencyAlertService, DEFAULT_EMERGENCY_MESSAGE};
