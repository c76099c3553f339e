//! Read-only connection pools over source databases.
//!
//! Source databases are never written. Every connection is opened with
//! `SQLITE_OPEN_READ_ONLY` and additionally pinned with `PRAGMA query_only`.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use romlookup_common::{Error, Result};
use rusqlite::{Connection, OpenFlags};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

fn read_only_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI
}

/// Open a read-only pool over an existing database file.
///
/// The file is checked before the pool is built: it must exist, must be a
/// SQLite database, and must contain every table in `required_tables`.
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file
/// * `required_tables` - Tables the caller's queries depend on
///
/// # Returns
///
/// * `Ok(DbPool)` - Pool of read-only connections
/// * `Err(Error::NotFound)` - If the file does not exist
/// * `Err(Error::Database)` - If the file is not a usable database
pub fn open_readonly(db_path: &Path, required_tables: &[&str]) -> Result<DbPool> {
    if !db_path.is_file() {
        return Err(Error::not_found(format!(
            "database file {}",
            db_path.display()
        )));
    }

    verify_tables(db_path, required_tables)?;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(read_only_flags())
        .with_init(|conn| conn.execute_batch("PRAGMA query_only = ON;"));

    Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))
}

fn verify_tables(db_path: &Path, required_tables: &[&str]) -> Result<()> {
    let conn = Connection::open_with_flags(db_path, read_only_flags())
        .map_err(|e| Error::database(format!("Failed to open {}: {}", db_path.display(), e)))?;

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
        .map_err(|e| Error::database(format!("{} is not a database: {}", db_path.display(), e)))?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let missing: Vec<&str> = required_tables
        .iter()
        .copied()
        .filter(|wanted| !tables.iter().any(|t| t == wanted))
        .collect();

    if !missing.is_empty() {
        return Err(Error::database(format!(
            "{} is missing tables: {}",
            db_path.display(),
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Get a connection from the pool.
///
/// This is a convenience wrapper around `pool.get()` that converts the
/// r2d2 error into our common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
