use async_trait::async_trait;
use tracing::{debug, error, info};

use health_helper_data::models::account::CreateAccountRequest;
use health_helper_data::repository::{AccountRepository, AccountRepositoryTrait, RepositoryError};

use crate::adapters::{AuthAdapter, AuthError};
use crate::entities::conversions::convert_to_domain_identity;
use crate::entities::profile::UserIdentity;
use crate::services::validation::{check_email, check_password};

/// Identity service backed by the local account repository.
/// Passwords are stored as bcrypt hashes.
pub struct LocalAuthAdapter<A: AccountRepositoryTrait> {
    accounts: A,
    bcrypt_cost: u32,
}

impl<A: AccountRepositoryTrait> LocalAuthAdapter<A> {
    pub fn new(accounts: A) -> Self {
        Self {
            accounts,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (4 is the minimum)
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Service(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AuthError::Service(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[async_trait]
impl<A: AccountRepositoryTrait + Send + Sync> AuthAdapter for LocalAuthAdapter<A> {
    async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        check_email(email.trim()).map_err(|_| AuthError::InvalidEmail)?;
        check_password(password).map_err(|_| AuthError::WeakPassword)?;

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let request = CreateAccountRequest {
            email: email.to_string(),
            password_hash,
            display_name: None,
        };

        match self.accounts.create(request).await {
            Ok(account) => {
                info!("Registered account {}", account.user_id);
                Ok(convert_to_domain_identity(account))
            },
            Err(RepositoryError::Conflict(_)) => Err(AuthError::EmailAlreadyInUse),
            Err(e) => {
                error!("Failed to create account: {}", e);
                Err(AuthError::Service(e.to_string()))
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await
            .map_err(|e| {
                error!("Failed to look up account: {}", e);
                AuthError::Service(e.to_string())
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash).await {
            debug!("Password mismatch for account {}", account.user_id);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(convert_to_domain_identity(account))
    }

    async fn sign_out(&self, user_id: &str) {
        // Local accounts keep no server-side session; tokens are revoked by the session registry
        debug!("Signed out user {}", user_id);
    }
}

/// Create the default identity adapter over the global database pool
pub fn create_default_auth_adapter() -> LocalAuthAdapter<AccountRepository> {
    LocalAuthAdapter::new(AccountRepository::new())
}
