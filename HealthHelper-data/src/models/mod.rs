// Storage models for the document-style records kept per user
pub mod account;
pub mod profile;
