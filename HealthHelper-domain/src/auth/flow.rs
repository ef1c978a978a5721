use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

use crate::adapters::{AuthAdapter, AuthError, ProfileStoreAdapter, StoreError};
use crate::auth::logging::{
    log_failed_login, log_logout, log_profile_creation, log_registration, log_successful_login,
};
use crate::entities::forms::{LoginForm, RegisterForm};
use crate::entities::profile::{UserIdentity, UserProfile};
use crate::services::validation::summarize;

/// Time allowed for writing the initial profile after registration
pub const DEFAULT_PROFILE_CREATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the registration and login flows
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("Validation error: {}", summarize(.0))]
    Validation(ValidationErrors),

    #[error("{}", registration_notice(.0))]
    Registration(AuthError),

    #[error("{0}")]
    Login(AuthError),
}

fn registration_notice(err: &AuthError) -> String {
    match err {
        AuthError::WeakPassword | AuthError::InvalidEmail | AuthError::EmailAlreadyInUse => err.to_string(),
        AuthError::Service(msg) => format!("Registration failed: {}", msg),
        AuthError::InvalidCredentials => format!("Registration failed: {}", err),
    }
}

/// What happened to the user's profile during a flow
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileStatus {
    /// Initial profile written
    Created,
    /// Existing profile read
    Loaded,
    /// The store answered with an error
    Failed(String),
    /// The store did not answer within the profile timeout
    TimedOut,
}

/// Successful registration or login
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub identity: UserIdentity,
    pub profile: Option<UserProfile>,
    pub profile_status: ProfileStatus,
}

/// Registration, login and sign-out
pub struct AuthService {
    auth: Arc<dyn AuthAdapter>,
    store: Arc<dyn ProfileStoreAdapter>,
    profile_timeout: Duration,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthAdapter>, store: Arc<dyn ProfileStoreAdapter>) -> Self {
        Self {
            auth,
            store,
            profile_timeout: DEFAULT_PROFILE_CREATE_TIMEOUT,
        }
    }

    pub fn with_profile_timeout(mut self, timeout: Duration) -> Self {
        self.profile_timeout = timeout;
        self
    }

    /// Write the zero-valued profile, bounded by the profile timeout
    async fn create_initial_profile(&self, identity: &UserIdentity) -> (Option<UserProfile>, ProfileStatus) {
        let profile = UserProfile::initial(identity);
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.profile_timeout, self.store.save_profile(&profile)).await;
        let elapsed = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(())) => {
                log_profile_creation(&identity.user_id, true, "initial profile created", elapsed);
                (Some(profile), ProfileStatus::Created)
            },
            Ok(Err(e)) => {
                log_profile_creation(&identity.user_id, false, &e.to_string(), elapsed);
                (None, ProfileStatus::Failed(e.to_string()))
            },
            Err(_) => {
                log_profile_creation(&identity.user_id, false, "profile creation timed out", elapsed);
                (None, ProfileStatus::TimedOut)
            }
        }
    }

    /// Create an account, then its initial profile.
    ///
    /// Registration succeeds once the account exists, whether or not the
    /// profile could be written.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthOutcome, AuthFlowError> {
        form.validate().map_err(AuthFlowError::Validation)?;
        let email = form.email.trim();

        let identity = match self.auth.register(email, &form.password).await {
            Ok(identity) => identity,
            Err(e) => {
                log_registration(email, false, Some(&e.to_string()));
                return Err(AuthFlowError::Registration(e));
            }
        };
        log_registration(&identity.user_id, true, None);

        let (profile, profile_status) = self.create_initial_profile(&identity).await;
        if profile.is_none() {
            warn!("Registered user {} without a stored profile: {:?}", identity.user_id, profile_status);
        }

        Ok(AuthOutcome { identity, profile, profile_status })
    }

    /// Authenticate, then load the profile.
    ///
    /// Accounts whose profile was never written get one now.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &LoginForm) -> Result<AuthOutcome, AuthFlowError> {
        form.validate().map_err(AuthFlowError::Validation)?;
        let email = form.email.trim();

        let identity = match self.auth.login(email, &form.password).await {
            Ok(identity) => identity,
            Err(e) => {
                log_failed_login(email, &e.to_string());
                return Err(AuthFlowError::Login(e));
            }
        };
        log_successful_login(&identity.user_id);

        let (profile, profile_status) = match self.store.get_profile(&identity.user_id).await {
            Ok(profile) => (Some(profile), ProfileStatus::Loaded),
            Err(StoreError::NotFound(_)) => {
                info!("No profile stored for user {}, creating one", identity.user_id);
                self.create_initial_profile(&identity).await
            },
            Err(e) => {
                warn!("Could not load profile for user {}: {}", identity.user_id, e);
                (None, ProfileStatus::Failed(e.to_string()))
            }
        };

        Ok(AuthOutcome { identity, profile, profile_status })
    }

    pub async fn sign_out(&self, user_id: &str) {
        self.auth.sign_out(user_id).await;
        log_logout(user_id);
    }
}
