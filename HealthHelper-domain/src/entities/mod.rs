// Domain entities and value objects
pub mod bmi;
pub mod conversions;
pub mod forms;
pub mod places;
pub mod profile;

// Re-export common types for easier imports
pub use bmi::{BmiCategory, BmiResult, Measurement};
pub use forms::{ContactForm, EmergencyMessageForm, LoginForm, MeasurementForm, RegisterForm};
pub use places::{GeoPosition, PlaceInfo, PlaceType};
pub use profile::{EmergencyContact, UserIdentity, UserProfile};
