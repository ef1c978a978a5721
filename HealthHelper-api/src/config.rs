//! Server configuration read from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use health_helper_domain::auth::flow::DEFAULT_PROFILE_CREATE_TIMEOUT;
use health_helper_domain::services::DEFAULT_EMERGENCY_MESSAGE;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for the HTTP server and its services
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub environment: String,
    /// How long registration waits for the initial profile write
    pub profile_create_timeout: Duration,
    /// Message prefilled for SOS alerts sent without one
    pub default_emergency_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            environment: "development".to_string(),
            profile_create_timeout: DEFAULT_PROFILE_CREATE_TIMEOUT,
            default_emergency_message: DEFAULT_EMERGENCY_MESSAGE.to_string(),
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `DATA_DIR`, `APP_ENV`, `PROFILE_CREATE_TIMEOUT_SECS` and
    /// `DEFAULT_EMERGENCY_MESSAGE`, keeping defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value })?,
            Err(_) => defaults.port,
        };

        let profile_create_timeout = match env::var("PROFILE_CREATE_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue { name: "PROFILE_CREATE_TIMEOUT_SECS", value })?,
            Err(_) => defaults.profile_create_timeout,
        };

        let default_emergency_message = env::var("DEFAULT_EMERGENCY_MESSAGE")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.default_emergency_message);

        Ok(Self {
            port,
            data_dir: env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
            profile_create_timeout,
            default_emergency_message,
        })
    }

    /// SQLite file used when `DB_SQLITE_PATH` is not set
    pub fn default_sqlite_path(&self) -> PathBuf {
        self.data_dir.join("health_helper.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.profile_create_timeout, Duration::from_secs(10));
        assert_eq!(
            config.default_emergency_message,
            "This is an emergency. I need help at my current location."
        );
        assert_eq!(config.default_sqlite_path(), PathBuf::from("data/health_helper.db"));
    }
}
