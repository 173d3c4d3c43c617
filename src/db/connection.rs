// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, APP_NAME};
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Resolve the database file path and make sure its directory exists.
///
/// Defaults to `{APP_DATA}/galleryhub/galleryhub.db` when the config
/// does not name a file.
pub fn get_database_path(config: &AppConfig) -> AppResult<PathBuf> {
    let path = match &config.database_path {
        Some(path) => path.clone(),
        None => dirs::data_dir()
            .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?
            .join(APP_NAME)
            .join(format!("{}.db", APP_NAME)),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(path)
}

/// Create the connection pool described by `config`
pub fn create_connection_pool(config: &AppConfig) -> AppResult<ConnectionPool> {
    let db_path = get_database_path(config)?;
    create_pool_at(&db_path, config.pool_max_size, config.busy_timeout_ms)
}

/// Create a pool over an explicit SQLite file.
///
/// Every connection gets foreign keys, WAL journaling and a busy timeout.
pub fn create_pool_at(db_path: &Path, max_size: u32, busy_timeout_ms: u32) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = {};",
            busy_timeout_ms
        ))
    });

    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    log::debug!(
        "opened sqlite pool at {} (max {} connections)",
        db_path.display(),
        max_size
    );

    Ok(pool)
}

/// Get a connection from the pool
///
/// This is a convenience wrapper that provides better error messages.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Create a standalone in-memory connection (for testing)
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::Database)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;

    Ok(conn)
}

/// In-memory pool with the schema applied.
///
/// Limited to a single connection: every in-memory connection is its own
/// database, so a larger pool would hand out empty databases.
#[cfg(test)]
pub fn create_test_pool() -> ConnectionPool {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("in-memory pool");

    {
        let conn = pool.get().expect("in-memory connection");
        crate::db::initialize_database(&conn).expect("schema");
    }

    pool
}
