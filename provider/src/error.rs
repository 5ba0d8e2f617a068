//! Error types for provider configuration and lifecycle.
//!
//! Covers configuration loading and validation, opening connections, and
//! access to a provider that has no data source bound.

use rowtree_sqlite::SqliteError;
use thiserror::Error;

/// Errors that can occur while configuring or binding a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A required configuration property is missing or empty.
    #[error("configuration is missing {0} property")]
    MissingProperty(&'static str),

    /// The data source could not open a connection.
    #[error("failed to create a connection for data source '{name}': {source}")]
    ConnectError {
        name: String,
        source: rusqlite::Error,
    },

    /// Schema setup or another storage operation failed.
    #[error("storage error: {0}")]
    StorageError(#[from] SqliteError),

    /// No data source is currently bound.
    #[error("database initialization failed: no data source named '{0}' is bound")]
    NotBound(String),
}

/// Convenience alias for results with [`ProviderError`].
pub type Result<T> = std::result::Result<T, ProviderError>;
