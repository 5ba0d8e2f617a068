//! Error types for SQLite resource operations.
//!
//! Provides a unified error type covering database access, value coercion,
//! schema setup, and configuration failures.

use thiserror::Error;

/// Errors that can occur while resolving resources against SQLite.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Property-to-SQL or SQL-to-property conversion failure.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// The create-table statement was rejected.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// Invalid setup parameter (e.g. an empty root path).
    #[error("configuration error: {0}")]
    ConfigError(#[from] rowtree_core::CoreError),

    /// A thread panicked while holding the connection lock.
    #[error("connection lock poisoned")]
    ConnectionPoisoned,
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
