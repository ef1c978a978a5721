pub mod auth;
pub mod bmi;
pub mod contacts;
pub mod errors;
mod flow;
pub mod health;
pub mod places;
pub mod profile;
pub mod sos;

// Re-export handlers for easier imports
pub use auth::{current_session, login, logout, register};
pub use bmi::{bmi_categories, commit_bmi, evaluate_bmi};
pub use contacts::{add_contact, delete_contact, list_contacts, update_contact};
pub use health::health_check;
pub use places::nearby_places;
pub use profile::get_profile;
pub use sos::send_sos;
