use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::account::AccountRecord;
use crate::models::profile::{ContactRecord, ProfileRecord};
use super::errors::RepositoryError;

/// Database storage operations for accounts and profiles
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a new account
    pub async fn insert_account(pool: &DatabasePool, account: &AccountRecord) -> Result<(), RepositoryError> {
        debug!("Storing account in database: user_id={}", account.user_id);

        let conn = pool.get()?;
        let result = conn.execute(
            "INSERT INTO accounts (user_id, email, password_hash, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &account.user_id,
                &account.email,
                &account.password_hash,
                &account.display_name,
                &account.created_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RepositoryError::Conflict(format!("Account already exists for {}", account.email)))
            },
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    /// Find an account by normalized email
    pub async fn find_account_by_email(pool: &DatabasePool, email: &str) -> Result<Option<AccountRecord>, RepositoryError> {
        debug!("Looking up account by email in database");

        let conn = pool.get()?;
        let account = conn.query_row(
            "SELECT user_id, email, password_hash, display_name, created_at
             FROM accounts WHERE email = ?1",
            params![email],
            |row| {
                Ok(AccountRecord {
                    user_id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    display_name: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        ).optional()?;

        Ok(account)
    }

    /// Insert or replace a whole profile document
    pub async fn upsert_profile(pool: &DatabasePool, profile: &ProfileRecord) -> Result<(), RepositoryError> {
        debug!("Storing profile in database: user_id={}", profile.user_id);

        let contacts = serde_json::to_string(&profile.emergency_contacts)?;
        let conditions = serde_json::to_string(&profile.health_conditions)?;

        let conn = pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_profiles
             (user_id, email, display_name, height, weight, last_bmi, emergency_contacts, health_conditions, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &profile.user_id,
                &profile.email,
                &profile.display_name,
                profile.height,
                profile.weight,
                profile.last_bmi,
                contacts,
                conditions,
                &profile.updated_at,
            ],
        )?;

        Ok(())
    }

    /// Get a profile document by user id
    pub async fn get_profile(pool: &DatabasePool, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        debug!("Getting profile from database: user_id={}", user_id);

        let conn = pool.get()?;
        let raw = conn.query_row(
            "SELECT user_id, email, display_name, height, weight, last_bmi,
                    emergency_contacts, health_conditions, updated_at
             FROM user_profiles WHERE user_id = ?1",
            params![user_id],
            read_profile_row,
        ).optional()?;

        match raw {
            Some((mut profile, contacts, conditions)) => {
                profile.emergency_contacts = serde_json::from_str(&contacts)?;
                profile.health_conditions = serde_json::from_str(&conditions)?;
                Ok(Some(profile))
            },
            None => Ok(None),
        }
    }

    /// Update the measurement fields of a profile, returning whether a row matched
    pub async fn update_measurement(
        pool: &DatabasePool,
        user_id: &str,
        height: f64,
        weight: f64,
        bmi: f64,
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        debug!("Updating measurement in database: user_id={}", user_id);

        let conn = pool.get()?;
        let rows = conn.execute(
            "UPDATE user_profiles SET height = ?2, weight = ?3, last_bmi = ?4, updated_at = ?5
             WHERE user_id = ?1",
            params![user_id, height, weight, bmi, updated_at],
        )?;

        Ok(rows > 0)
    }

    /// Replace the contact list of a profile, returning whether a row matched
    pub async fn update_contacts(
        pool: &DatabasePool,
        user_id: &str,
        contacts: &[ContactRecord],
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        debug!("Updating {} emergency contacts in database: user_id={}", contacts.len(), user_id);

        let encoded = serde_json::to_string(contacts)?;
        let conn = pool.get()?;
        let rows = conn.execute(
            "UPDATE user_profiles SET emergency_contacts = ?2, updated_at = ?3 WHERE user_id = ?1",
            params![user_id, encoded, updated_at],
        )?;

        Ok(rows > 0)
    }
}

/// Read a profile row, leaving the JSON columns undecoded
fn read_profile_row(row: &Row<'_>) -> rusqlite::Result<(ProfileRecord, String, String)> {
    let profile = ProfileRecord {
        user_id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        height: row.get(3)?,
        weight: row.get(4)?,
        last_bmi: row.get(5)?,
        emergency_contacts: Vec::new(),
        health_conditions: Vec::new(),
        updated_at: row.get(8)?,
    };
    Ok((profile, row.get(6)?, row.get(7)?))
}
