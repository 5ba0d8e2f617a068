//! Binding a resource provider to a data source.
//!
//! [`ProviderFactory`] is activated with a [`ProviderConfig`] and then told
//! about data sources as the environment makes them available:
//!
//! - [`attach`](ProviderFactory::attach) when a source appears,
//! - [`reattach`](ProviderFactory::reattach) when the bound source changes,
//! - [`detach`](ProviderFactory::detach) when it goes away.
//!
//! While bound, [`resource_provider`](ProviderFactory::resource_provider)
//! hands out the [`ResourceDataFactory`] built over the source's connection.
//! Only one source is bound at a time; later arrivals are ignored until the
//! current one is detached.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rowtree_provider::{ProviderConfig, ProviderFactory, SqliteDataSource};
//!
//! let config = ProviderConfig::new("accounts-db", "/accounts-root");
//! let mut factory = ProviderFactory::activate(config).unwrap();
//!
//! factory
//!     .attach(Arc::new(SqliteDataSource::in_memory("accounts-db")))
//!     .unwrap();
//! let provider = factory.resource_provider().unwrap();
//! assert!(provider.get("/accounts-root/accounts").unwrap().is_some());
//!
//! factory.deactivate();
//! assert!(!provider.is_live());
//! ```

use std::sync::Arc;

use rowtree_sqlite::{ResourceDataFactory, SharedConnection, share};
use tracing::{debug, error, info};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::source::DataSource;

struct Binding {
    source: Arc<dyn DataSource>,
    connection: SharedConnection,
    factory: Arc<ResourceDataFactory>,
}

/// Lifecycle owner of the connection behind a [`ResourceDataFactory`].
pub struct ProviderFactory {
    config: ProviderConfig,
    binding: Option<Binding>,
}

impl ProviderFactory {
    /// Activates a factory for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingProperty`] if the configuration lacks
    /// a data source name or root.
    pub fn activate(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        info!(
            datasource = %config.datasource_name,
            root = %config.root,
            "resource provider factory activated"
        );
        Ok(Self {
            config,
            binding: None,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns `true` while a data source is bound.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns `true` if `source` is the one this factory is configured for.
    pub fn matches(&self, source: &dyn DataSource) -> bool {
        source.name() == self.config.datasource_name
    }

    /// Binds `source`, opening a connection and building the resource data
    /// factory over it.
    ///
    /// Returns `Ok(false)` without side effects if `source` does not match
    /// the configuration or another source is already bound.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ConnectError`] if the connection cannot be
    /// opened, or [`ProviderError::StorageError`] if schema setup fails. The
    /// factory stays unbound in both cases.
    pub fn attach(&mut self, source: Arc<dyn DataSource>) -> Result<bool> {
        if !self.matches(source.as_ref()) {
            debug!(
                datasource = source.name(),
                expected = %self.config.datasource_name,
                "ignoring non-matching data source"
            );
            return Ok(false);
        }
        if self.binding.is_some() {
            info!(
                datasource = source.name(),
                "a data source is already bound, ignoring new data source"
            );
            return Ok(false);
        }

        let conn = source.connect().map_err(|e| {
            error!(datasource = source.name(), error = %e, "failed to create a connection");
            ProviderError::ConnectError {
                name: source.name().to_string(),
                source: e,
            }
        })?;
        let connection = share(conn);
        let factory = ResourceDataFactory::new(connection.clone(), self.config.root.as_str())?;

        info!(datasource = source.name(), root = %factory.root(), "bound data source");
        self.binding = Some(Binding {
            source,
            connection,
            factory: Arc::new(factory),
        });
        Ok(true)
    }

    /// Rebinds after the bound source changed.
    ///
    /// Returns `Ok(false)` if `source` is not the currently bound source.
    pub fn reattach(&mut self, source: Arc<dyn DataSource>) -> Result<bool> {
        let is_bound_source = self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.source.name() == source.name());
        if !is_bound_source {
            return Ok(false);
        }

        info!(datasource = source.name(), "updating data source");
        self.detach();
        self.attach(source)
    }

    /// Unbinds the current source, closing the resource data factory.
    ///
    /// The connection is closed once no handed-out provider still uses it.
    pub fn detach(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        let name = binding.source.name().to_string();
        binding.factory.close();
        drop(binding.factory);

        match Arc::try_unwrap(binding.connection) {
            Ok(mutex) => {
                let conn = mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err((_, e)) = conn.close() {
                    error!(datasource = %name, error = %e, "failed to close connection");
                }
            }
            Err(_) => {
                debug!(datasource = %name, "connection still in use, closing when released");
            }
        }
        info!(datasource = %name, "data source unbound");
    }

    /// Returns the resource data factory of the bound source.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotBound`] if no source is bound.
    pub fn resource_provider(&self) -> Result<Arc<ResourceDataFactory>> {
        match &self.binding {
            Some(binding) => {
                debug!(root = %binding.factory.root(), "handing out resource provider");
                Ok(Arc::clone(&binding.factory))
            }
            None => Err(ProviderError::NotBound(self.config.datasource_name.clone())),
        }
    }

    /// Detaches any bound source and shuts the factory down.
    pub fn deactivate(mut self) {
        info!(datasource = %self.config.datasource_name, "deactivating resource provider factory");
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rowtree_core::{PropertyMap, Resource};
    use rowtree_sqlite::SqliteError;
    use rusqlite::{Connection, OpenFlags};

    use super::*;
    use crate::source::SqliteDataSource;

    struct BrokenSource;

    impl DataSource for BrokenSource {
        fn name(&self) -> &str {
            "db"
        }

        fn connect(&self) -> rusqlite::Result<Connection> {
            Err(rusqlite::Error::InvalidQuery)
        }
    }

    struct ReadOnlySource(PathBuf);

    impl DataSource for ReadOnlySource {
        fn name(&self) -> &str {
            "db"
        }

        fn connect(&self) -> rusqlite::Result<Connection> {
            Connection::open_with_flags(&self.0, OpenFlags::SQLITE_OPEN_READ_ONLY)
        }
    }

    fn activated() -> ProviderFactory {
        ProviderFactory::activate(ProviderConfig::new("db", "/x")).unwrap()
    }

    fn memory(name: &str) -> Arc<dyn DataSource> {
        Arc::new(SqliteDataSource::in_memory(name))
    }

    #[test]
    fn test_activate_requires_datasource_name() {
        let result = ProviderFactory::activate(ProviderConfig::new("", "/x"));
        assert!(matches!(
            result,
            Err(ProviderError::MissingProperty("datasource_name"))
        ));
    }

    #[test]
    fn test_unbound_provider_is_an_error() {
        let factory = activated();
        assert!(!factory.is_bound());
        assert!(matches!(
            factory.resource_provider(),
            Err(ProviderError::NotBound(name)) if name == "db"
        ));
    }

    #[test]
    fn test_attach_matching_source() {
        let mut factory = activated();
        assert!(factory.attach(memory("db")).unwrap());
        assert!(factory.is_bound());

        let provider = factory.resource_provider().unwrap();
        assert_eq!(provider.root().as_str(), "/x/");
        assert!(provider.is_live());
    }

    #[test]
    fn test_attach_ignores_other_names() {
        let mut factory = activated();
        assert!(!factory.attach(memory("other")).unwrap());
        assert!(!factory.is_bound());
    }

    #[test]
    fn test_attach_ignores_second_source() {
        let mut factory = activated();
        assert!(factory.attach(memory("db")).unwrap());
        let first = factory.resource_provider().unwrap();

        assert!(!factory.attach(memory("db")).unwrap());
        let second = factory.resource_provider().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_attach_failure_leaves_factory_unbound() {
        let mut factory = activated();
        let err = factory.attach(Arc::new(BrokenSource)).unwrap_err();
        assert!(matches!(err, ProviderError::ConnectError { .. }));
        assert!(!factory.is_bound());
    }

    #[test]
    fn test_schema_failure_leaves_factory_unbound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE OTHER (ID INTEGER);")
            .unwrap();

        let mut factory = activated();
        let err = factory.attach(Arc::new(ReadOnlySource(path))).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::StorageError(SqliteError::SchemaError(_))
        ));
        assert!(!factory.is_bound());
        assert!(matches!(
            factory.resource_provider(),
            Err(ProviderError::NotBound(_))
        ));
    }

    #[test]
    fn test_detach_closes_handed_out_provider() {
        let mut factory = activated();
        factory.attach(memory("db")).unwrap();
        let provider = factory.resource_provider().unwrap();

        factory.detach();
        assert!(!factory.is_bound());
        assert!(!provider.is_live());
        assert!(factory.resource_provider().is_err());

        // Detaching twice is harmless.
        factory.detach();
    }

    #[test]
    fn test_reattach_rebuilds_provider() {
        let dir = tempfile::tempdir().unwrap();
        let source: Arc<dyn DataSource> =
            Arc::new(SqliteDataSource::file("db", dir.path().join("a.db")));

        let mut factory = activated();
        factory.attach(Arc::clone(&source)).unwrap();
        let before = factory.resource_provider().unwrap();
        before
            .put(
                "/x/accounts/u1",
                Some(&Resource::record("/x/accounts/u1", PropertyMap::new())),
            )
            .unwrap();

        assert!(factory.reattach(Arc::clone(&source)).unwrap());
        let after = factory.resource_provider().unwrap();
        assert!(!before.is_live());
        assert!(after.is_live());
        assert!(after.get("/x/accounts/u1").unwrap().is_some());
    }

    #[test]
    fn test_reattach_ignores_unbound_source() {
        let mut factory = activated();
        assert!(!factory.reattach(memory("db")).unwrap());
        assert!(!factory.is_bound());
    }
}
