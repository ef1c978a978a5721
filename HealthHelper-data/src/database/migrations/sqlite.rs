use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_accounts_table(conn)?;
    create_user_profiles_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the accounts table
fn create_accounts_table(conn: &Connection) -> Result<(), String> {
    info!("Creating accounts table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the user profiles table
///
/// Contacts and health conditions are kept as JSON arrays so a profile
/// reads and writes as one document.
fn create_user_profiles_table(conn: &Connection) -> Result<(), String> {
    info!("Creating user_profiles table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_profiles (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            display_name TEXT NOT NULL DEFAULT '',
            height REAL NOT NULL DEFAULT 0,
            weight REAL NOT NULL DEFAULT 0,
            last_bmi REAL NOT NULL DEFAULT 0,
            emergency_contacts TEXT NOT NULL DEFAULT '[]',
            health_conditions TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| format!("Failed to create user_profiles table: {}", e))?;

    Ok(())
}
