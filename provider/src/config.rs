//! Provider configuration.
//!
//! Defines the YAML-serializable settings a provider is activated with: the
//! name of the data source it binds to, the root path it serves, and where
//! the SQLite database lives.
//!
//! # Example YAML
//!
//! ```yaml
//! datasource_name: accounts-db
//! root: /accounts-root
//! database:
//!   path: /var/lib/rowtree/accounts.db
//! ```
//!
//! Omitting `database.path` selects an in-memory database.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::source::SqliteDataSource;

/// Where the provider's database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path; `None` means in-memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Settings a [`ProviderFactory`](crate::ProviderFactory) is activated with.
///
/// # Examples
///
/// ```
/// use rowtree_provider::ProviderConfig;
///
/// let config: ProviderConfig = serde_yaml::from_str(
///     "datasource_name: accounts-db\nroot: /accounts-root\n",
/// ).unwrap();
/// assert!(config.validate().is_ok());
/// assert!(config.database.path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the data source to bind to.
    #[serde(default)]
    pub datasource_name: String,
    /// Root path served by the provider.
    #[serde(default)]
    pub root: String,
    /// Database location.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl ProviderConfig {
    /// Creates a configuration for an in-memory database.
    pub fn new(datasource_name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            datasource_name: datasource_name.into(),
            root: root.into(),
            database: DatabaseConfig::default(),
        }
    }

    /// Sets the database file path.
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database.path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ProviderError::IoError) if the file cannot be
    /// read, or [`YamlError`](ProviderError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that every required property is present.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingProperty`] for an empty
    /// `datasource_name` or `root`.
    pub fn validate(&self) -> Result<()> {
        if self.datasource_name.trim().is_empty() {
            return Err(ProviderError::MissingProperty("datasource_name"));
        }
        if self.root.trim().is_empty() {
            return Err(ProviderError::MissingProperty("root"));
        }
        Ok(())
    }

    /// Builds the data source described by this configuration.
    pub fn data_source(&self) -> SqliteDataSource {
        match &self.database.path {
            Some(path) => SqliteDataSource::file(&self.datasource_name, path),
            None => SqliteDataSource::in_memory(&self.datasource_name),
        }
    }
}
