use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::database::{get_db_pool, DatabaseError, DatabasePool};
use crate::models::account::{normalize_email, AccountRecord, CreateAccountRequest};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for registered accounts
#[async_trait]
pub trait AccountRepositoryTrait {
    /// Create a new account, failing with `Conflict` if the email is taken
    async fn create(&self, request: CreateAccountRequest) -> Result<AccountRecord, RepositoryError>;

    /// Find an account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError>;
}

/// Repository for accounts.
/// Uses the SQLite pool when available and shared in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct AccountRepository {
    /// Explicit pool; the global pool is used when absent
    pool: Option<DatabasePool>,
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl AccountRepository {
    /// Create a repository backed by the global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository backed by the given pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    fn pool(&self) -> Result<DatabasePool, DatabaseError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => get_db_pool(),
        }
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, request: CreateAccountRequest) -> Result<AccountRecord, RepositoryError> {
        let account = AccountRecord {
            user_id: Uuid::new_v4().to_string(),
            email: normalize_email(&request.email),
            password_hash: request.password_hash,
            display_name: request.display_name.unwrap_or_default(),
            created_at: Utc::now().to_rfc3339(),
        };

        match self.pool() {
            Ok(pool) => {
                debug!("Storing account in database: {}", account.user_id);
                match DatabaseStorage::insert_account(&pool, &account).await {
                    Ok(_) => Ok(account),
                    Err(e) if e.is_backend_failure() => {
                        error!("Failed to store account in database: {}", e);
                        self.storage.insert_account(&account).await.map(|_| account)
                    },
                    Err(e) => Err(e),
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.insert_account(&account).await.map(|_| account)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError> {
        let email = normalize_email(email);

        match self.pool() {
            Ok(pool) => {
                match DatabaseStorage::find_account_by_email(&pool, &email).await {
                    Ok(Some(account)) => Ok(Some(account)),
                    // Accounts created during a database outage only exist in memory
                    Ok(None) => self.storage.find_account_by_email(&email).await,
                    // Only an account created in memory can answer while the database is down
                    Err(e) => {
                        error!("Failed to look up account in database: {}", e);
                        match self.storage.find_account_by_email(&email).await? {
                            Some(account) => Ok(Some(account)),
                            None => Err(e),
                        }
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for find_by_email", e);
                self.storage.find_account_by_email(&email).await
            }
        }
    }
}

/// Mock account repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of AccountRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockAccountRepository {
        accounts: Mutex<Vec<AccountRecord>>,
        should_fail: bool,
    }

    impl MockAccountRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository whose every call fails
        pub fn failing() -> Self {
            Self { should_fail: true, ..Self::default() }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.should_fail {
                Err(RepositoryError::Database(DatabaseError::Unavailable(
                    "mock is configured to fail".to_string(),
                )))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AccountRepositoryTrait for MockAccountRepository {
        async fn create(&self, request: CreateAccountRequest) -> Result<AccountRecord, RepositoryError> {
            self.check()?;
            let email = normalize_email(&request.email);
            let mut accounts = self.accounts.lock()?;
            if accounts.iter().any(|a| a.email == email) {
                return Err(RepositoryError::Conflict(email));
            }
            let account = AccountRecord {
                user_id: Uuid::new_v4().to_string(),
                email,
                password_hash: request.password_hash,
                display_name: request.display_name.unwrap_or_default(),
                created_at: Utc::now().to_rfc3339(),
            };
            accounts.push(account.clone());
            Ok(account)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError> {
            self.check()?;
            let email = normalize_email(email);
            let accounts = self.accounts.lock()?;
            Ok(accounts.iter().find(|a| a.email == email).cloned())
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        fn request(email: &str) -> CreateAccountRequest {
            CreateAccountRequest {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                display_name: None,
            }
        }

        #[tokio::test]
        async fn test_create_and_find_account_in_database() {
            let repo = AccountRepository::with_pool(DatabasePool::in_memory().unwrap());

            let created = repo.create(request("User@Example.com ")).await.unwrap();
            assert_eq!(created.email, "user@example.com");

            let found = repo.find_by_email("USER@example.com").await.unwrap().unwrap();
            assert_eq!(found.user_id, created.user_id);
            assert!(repo.find_by_email("other@example.com").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_duplicate_email_is_conflict() {
            let repo = AccountRepository::with_pool(DatabasePool::in_memory().unwrap());

            repo.create(request("user@example.com")).await.unwrap();
            let err = repo.create(request("user@example.com")).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Conflict(_)));
        }

        #[tokio::test]
        async fn test_lookup_during_database_outage() {
            let pool = DatabasePool::in_memory().unwrap();
            let repo = AccountRepository::with_pool(pool.clone());
            pool.get().unwrap().execute_batch("DROP TABLE accounts").unwrap();

            let err = repo.find_by_email("user@example.com").await.unwrap_err();
            assert!(err.is_backend_failure());

            // Written to memory while the table is gone, so still found
            let created = repo.create(request("user@example.com")).await.unwrap();
            let found = repo.find_by_email("user@example.com").await.unwrap().unwrap();
            assert_eq!(found.user_id, created.user_id);
        }

        #[tokio::test]
        async fn test_mock_repository_conflict() {
            let repo = MockAccountRepository::new();
            repo.create(request("a@b.io")).await.unwrap();
            assert!(matches!(
                repo.create(request("A@B.io")).await,
                Err(RepositoryError::Conflict(_))
            ));
            assert!(MockAccountRepository::failing().find_by_email("a@b.io").await.is_err());
        }
    }
}
