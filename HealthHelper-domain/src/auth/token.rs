use std::env;
use thiserror::Error;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::Claims;

/// Default session lifetime
pub const DEFAULT_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// Longest session lifetime accepted from configuration (one year)
pub const MAX_TOKEN_EXPIRATION_HOURS: i64 = 24 * 365;

/// Security errors for token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// The session behind the token was signed out or has expired
    #[error("Session has ended")]
    TokenRevoked,

    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

/// Signing configuration for session tokens
#[derive(Clone)]
pub struct TokenSettings {
    secret: String,
    issuer: String,
    expiration: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl TokenSettings {
    /// Lifetimes outside `1..=MAX_TOKEN_EXPIRATION_HOURS` are clamped into it
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration: Duration::hours(expiration_hours.clamp(1, MAX_TOKEN_EXPIRATION_HOURS)),
        }
    }

    /// Load settings from `JWT_SECRET`, `JWT_ISSUER` and `SESSION_TOKEN_EXPIRATION_HOURS`.
    ///
    /// Outside production a missing secret is replaced by a random one, which
    /// invalidates every session on restart.
    pub fn from_env() -> Result<Self, SecurityError> {
        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "health-helper-api".to_string());
        let expiration_hours = parse_expiration_hours(env::var("SESSION_TOKEN_EXPIRATION_HOURS").ok().as_deref())?;

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
                if app_env.eq_ignore_ascii_case("production") {
                    error!("JWT_SECRET environment variable not found");
                    return Err(SecurityError::ConfigError(
                        "JWT_SECRET environment variable not found".to_string(),
                    ));
                }
                warn!("JWT_SECRET not set; using a random secret for this process");
                random_secret()
            }
        };

        info!("Session tokens: issuer={}, lifetime={}h", issuer, expiration_hours);
        Ok(Self::new(secret, issuer, expiration_hours))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }
}

/// Unset, unparsable or non-positive values fall back to the default.
/// Anything past the cap is a configuration error rather than a silent clamp.
fn parse_expiration_hours(raw: Option<&str>) -> Result<i64, SecurityError> {
    let hours = match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(hours) if hours > 0 => hours,
        _ => return Ok(DEFAULT_TOKEN_EXPIRATION_HOURS),
    };
    if hours > MAX_TOKEN_EXPIRATION_HOURS {
        error!("SESSION_TOKEN_EXPIRATION_HOURS={} exceeds {}", hours, MAX_TOKEN_EXPIRATION_HOURS);
        return Err(SecurityError::ConfigError(format!(
            "SESSION_TOKEN_EXPIRATION_HOURS must be at most {}",
            MAX_TOKEN_EXPIRATION_HOURS
        )));
    }
    Ok(hours)
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

/// A freshly signed session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// The `jti` claim, used as the session key
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Sign a new session token for a user
pub fn generate_token(settings: &TokenSettings, user_id: &str) -> Result<IssuedToken, SecurityError> {
    let now = Utc::now();
    let expires_at = now.checked_add_signed(settings.expiration).ok_or_else(|| {
        error!("Token lifetime {} overflows the clock", settings.expiration);
        SecurityError::ConfigError("Token lifetime is out of range".to_string())
    })?;
    let token_id = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id.to_string(),
        iss: settings.issuer.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: token_id.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    info!("Generated session token for user {}", user_id);
    debug!("Token expiration: {}", expires_at);

    Ok(IssuedToken { token, token_id, expires_at })
}

/// Validate a token's signature, issuer and expiry
pub fn validate_token(settings: &TokenSettings, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[settings.issuer.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        },
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TokenSettings {
        TokenSettings::new("test_secret_key_for_testing_only", "test-issuer", 24)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let issued = generate_token(&settings(), "test-user-123").unwrap();
        assert!(!issued.token.is_empty());

        let claims = validate_token(&settings(), &issued.token).unwrap();
        assert_eq!(claims.sub, "test-user-123");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.jti, issued.token_id);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_token_expiration() {
        let claims = Claims {
            sub: "test-user-456".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            jti: "expired".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_only".as_bytes()),
        )
        .unwrap();

        match validate_token(&settings(), &token) {
            Err(SecurityError::TokenExpired) => {},
            other => panic!("Expected TokenExpired error but got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_or_issuer() {
        let issued = generate_token(&settings(), "u1").unwrap();

        let other_secret = TokenSettings::new("another_secret", "test-issuer", 24);
        assert!(validate_token(&other_secret, &issued.token).is_err());

        let other_issuer = TokenSettings::new("test_secret_key_for_testing_only", "someone-else", 24);
        assert!(validate_token(&other_issuer, &issued.token).is_err());
    }

    #[test]
    fn test_expiration_hours_from_env_value() {
        assert_eq!(parse_expiration_hours(None).unwrap(), DEFAULT_TOKEN_EXPIRATION_HOURS);
        assert_eq!(parse_expiration_hours(Some("abc")).unwrap(), DEFAULT_TOKEN_EXPIRATION_HOURS);
        assert_eq!(parse_expiration_hours(Some("-5")).unwrap(), DEFAULT_TOKEN_EXPIRATION_HOURS);
        assert_eq!(parse_expiration_hours(Some(" 48 ")).unwrap(), 48);

        match parse_expiration_hours(Some("9223372036854775807")) {
            Err(SecurityError::ConfigError(msg)) => assert!(msg.contains("at most")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_lifetime_is_clamped() {
        let settings = TokenSettings::new("test_secret_key_for_testing_only", "test-issuer", i64::MAX);
        assert_eq!(settings.expiration(), Duration::hours(MAX_TOKEN_EXPIRATION_HOURS));

        let issued = generate_token(&settings, "u1").unwrap();
        assert!(issued.expires_at > Utc::now() + Duration::days(364));
    }

    #[test]
    fn test_invalid_token() {
        match validate_token(&settings(), "invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {},
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }
}
