//! Error types for path and value handling.

use thiserror::Error;

/// Errors raised while setting up path resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The configured root path is empty.
    #[error("root path must not be empty")]
    EmptyRoot,
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
