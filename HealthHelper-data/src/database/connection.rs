//! SQLite pool shared by the account and profile repositories.
//!
//! The pool is opened once at startup from `DB_*` environment variables and
//! stored in a process-wide cell. Repositories that find no pool keep their
//! data in memory instead.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::migrations::run_sqlite_migrations;

static SHARED_POOL: OnceCell<DatabasePool> = OnceCell::new();

const DEFAULT_SQLITE_PATH: &str = "data/health_helper.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Where the profile and account tables are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// A SQLite file on disk
    Sqlite,
    /// A private in-memory SQLite database, lost on restart
    Memory,
}

impl DatabaseType {
    /// Parse the `DB_TYPE` value, case-insensitively
    pub fn from_str(value: &str) -> Result<Self, DatabaseError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "in-memory" => Ok(Self::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(value.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Storage refused the operation for a reason outside SQLite itself
    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

/// Settings read from `DB_TYPE`, `DB_SQLITE_PATH`, `DB_MAX_CONNECTIONS`
/// (or `DB_POOL_SIZE`) and `DB_TIMEOUT_SECONDS`
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub db_type: DatabaseType,
    pub sqlite_path: Option<String>,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// First parseable, non-zero value among the named variables
fn positive_env<T>(names: &[&str]) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(|raw| raw.trim().parse::<T>().ok().filter(|n| *n > T::default()))
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type = match env::var("DB_TYPE") {
            Ok(raw) => DatabaseType::from_str(&raw)?,
            Err(_) => DatabaseType::Sqlite,
        };

        let config = Self {
            db_type,
            sqlite_path: env::var("DB_SQLITE_PATH").ok().filter(|p| !p.trim().is_empty()),
            max_connections: positive_env(&["DB_MAX_CONNECTIONS", "DB_POOL_SIZE"])
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            timeout_seconds: positive_env(&["DB_TIMEOUT_SECONDS"]).unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };

        debug!(
            db_type = ?config.db_type,
            path = ?config.sqlite_path,
            max_connections = config.max_connections,
            timeout_seconds = config.timeout_seconds,
            "Loaded database settings"
        );
        Ok(config)
    }

    fn resolved_path(&self) -> PathBuf {
        PathBuf::from(self.sqlite_path.as_deref().unwrap_or(DEFAULT_SQLITE_PATH))
    }

    /// Open a migrated pool for these settings.
    ///
    /// A file database that cannot be opened degrades to an in-memory one;
    /// only a failure of the in-memory fallback is returned as an error.
    pub fn open_pool(&self) -> Result<DatabasePool, DatabaseError> {
        let pool = match self.db_type {
            DatabaseType::Memory => {
                info!("Using in-memory SQLite; stored data will not survive a restart");
                return DatabasePool::in_memory();
            }
            DatabaseType::Sqlite => {
                let path = self.resolved_path();
                match self.open_file_pool(&path) {
                    Ok(pool) => {
                        info!("Opened SQLite database at {}", path.display());
                        pool
                    }
                    Err(e) => {
                        warn!("Cannot open SQLite database at {} ({}); using in-memory storage", path.display(), e);
                        return DatabasePool::in_memory();
                    }
                }
            }
        };

        pool.migrate()?;
        Ok(pool)
    }

    fn open_file_pool(&self, path: &Path) -> Result<DatabasePool, DatabaseError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| DatabaseError::Unavailable(format!("{}: {}", dir.display(), e)))?;
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
        let pool = Pool::builder()
            .max_size(self.max_connections)
            .connection_timeout(Duration::from_secs(self.timeout_seconds))
            .build(manager)?;

        Ok(DatabasePool { inner: Arc::new(pool) })
    }
}

/// Cloneable handle to the r2d2 pool
#[derive(Debug, Clone)]
pub struct DatabasePool {
    inner: Arc<Pool<SqliteConnectionManager>>,
}

impl DatabasePool {
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.inner.get()
    }

    pub fn state(&self) -> r2d2::State {
        self.inner.state()
    }

    /// Migrated pool over a private in-memory database.
    ///
    /// Every in-memory connection is a separate database, so the pool holds
    /// exactly one.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let inner = Pool::builder().max_size(1).build(SqliteConnectionManager::memory())?;
        let pool = Self { inner: Arc::new(inner) };
        pool.migrate()?;
        Ok(pool)
    }

    pub fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
    }

    /// Where the data lives and how the pool is doing
    pub fn status(&self) -> PoolStatus {
        match self.describe() {
            Ok((file, usage)) if file.is_empty() || file == ":memory:" => {
                PoolStatus::InMemory(format!("SQLite in-memory database, data is lost on restart ({})", usage))
            },
            Ok((file, usage)) => PoolStatus::Persistent(format!("SQLite database at {} ({})", file, usage)),
            Err(e) => PoolStatus::Unreachable(format!("SQLite connection error: {}", e)),
        }
    }

    fn describe(&self) -> Result<(String, String), DatabaseError> {
        let conn = self.get()?;
        let file: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;
        let state = self.state();
        Ok((
            file,
            format!("connections: active={}, idle={}", state.connections, state.idle_connections),
        ))
    }
}

/// Health of the shared pool as seen by a probe query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolStatus {
    /// File-backed and answering
    Persistent(String),
    /// Answering, but nothing survives a restart
    InMemory(String),
    /// No connection could be taken
    Unreachable(String),
}

impl PoolStatus {
    pub fn details(&self) -> &str {
        match self {
            Self::Persistent(details) | Self::InMemory(details) | Self::Unreachable(details) => details,
        }
    }
}

/// Open the shared pool from the environment. Fails if called twice.
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if SHARED_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let pool = DatabaseConfig::from_env()?.open_pool()?;
    SHARED_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    SHARED_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Status of the shared pool for the health check; `None` when no pool was opened
pub fn get_pool_status() -> Option<PoolStatus> {
    let status = SHARED_POOL.get()?.status();
    if let PoolStatus::Unreachable(details) = &status {
        warn!("Database health probe failed: {}", details);
    }
    Some(status)
}
