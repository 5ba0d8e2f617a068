//! Configuration and lifecycle binding for rowtree resource providers.
//!
//! This crate connects a [`ResourceDataFactory`](rowtree_sqlite::ResourceDataFactory)
//! to the environment it runs in:
//!
//! - [`ProviderConfig`] — YAML settings naming the data source and root
//! - [`DataSource`] / [`SqliteDataSource`] — named connection factories
//! - [`ProviderFactory`] — activation plus attach/reattach/detach hooks that
//!   own the connection's lifetime
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rowtree_provider::{ProviderConfig, ProviderFactory};
//!
//! let config = ProviderConfig::load("provider.yml").unwrap();
//! let source = Arc::new(config.data_source());
//!
//! let mut factory = ProviderFactory::activate(config).unwrap();
//! factory.attach(source).unwrap();
//!
//! let provider = factory.resource_provider().unwrap();
//! for child in provider.list_children("/accounts-root/accounts").unwrap() {
//!     println!("{child}");
//! }
//! ```

mod config;
mod error;
mod lifecycle;
mod source;

pub use config::{DatabaseConfig, ProviderConfig};
pub use error::{ProviderError, Result};
pub use lifecycle::ProviderFactory;
pub use source::{DataSource, Location, SqliteDataSource};
