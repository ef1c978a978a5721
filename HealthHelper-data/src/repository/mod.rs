// Repository module structure
pub mod errors;
mod account;
mod profile;
mod in_memory;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use account::{AccountRepository, AccountRepositoryTrait};
pub use profile::{ProfileRepository, ProfileRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::account::tests::MockAccountRepository;
    pub use super::profile::tests::MockProfileRepository;
}
