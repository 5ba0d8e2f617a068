//! Named sources of database connections.
//!
//! A [`DataSource`] is what the environment offers a provider: something
//! with a name that can open a live connection. The provider binds to the
//! source whose name matches its configuration.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

/// A named connection factory.
pub trait DataSource: Send + Sync {
    /// Name the source is registered under.
    fn name(&self) -> &str;

    /// Opens a new live connection.
    fn connect(&self) -> rusqlite::Result<Connection>;
}

/// Where a [`SqliteDataSource`] keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A database file, created on first connect.
    File(PathBuf),
    /// A private in-memory database per connection.
    Memory,
}

/// A [`DataSource`] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    name: String,
    location: Location,
}

impl SqliteDataSource {
    /// Creates a file-backed source.
    pub fn file(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            location: Location::File(path.as_ref().to_path_buf()),
        }
    }

    /// Creates an in-memory source.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Location::Memory,
        }
    }

    /// Returns the database location.
    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl DataSource for SqliteDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match &self.location {
            Location::File(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        }
    }
}
