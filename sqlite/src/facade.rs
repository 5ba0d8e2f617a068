//! Path-addressed access to table rows.
//!
//! [`ResourceDataFactory`] is the entry point for a resource-tree framework.
//! It resolves incoming paths against its root and dispatches on what they
//! address:
//!
//! | path                      | get             | put             | list children  |
//! |---------------------------|-----------------|-----------------|----------------|
//! | `<root>/accounts`         | table resource  | rejected        | row paths      |
//! | `<root>/accounts/{key}`   | row or `None`   | upsert / delete | empty          |
//! | anything else             | `None`          | rejected        | empty          |
//!
//! Storage failures are returned as [`SqliteError`]; they are never folded
//! into `None`.
//!
//! # Example
//!
//! ```
//! use rowtree_core::{PropertyMap, Resource};
//! use rowtree_sqlite::{ResourceDataFactory, share};
//! use rusqlite::Connection;
//!
//! let conn = share(Connection::open_in_memory().unwrap());
//! let factory = ResourceDataFactory::new(conn, "/x").unwrap();
//!
//! let mut props = PropertyMap::new();
//! props.insert("name".into(), "Ann".into());
//! factory
//!     .put("/x/accounts/u1", Some(&Resource::record("/x/accounts/u1", props)))
//!     .unwrap();
//!
//! let row = factory.get("/x/accounts/u1").unwrap().unwrap();
//! assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("Ann"));
//! assert_eq!(factory.list_children("/x/accounts").unwrap(), ["/x/accounts/u1"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rowtree_core::{
    PropertyMap, PropertyValue, Resource, ResourcePath, RootPath, SEPARATOR, Table, Target,
};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{SharedConnection, TableStatus, TableStore};

/// Property carrying the table name on table-level resources.
pub const TABLE_NAME_PROPERTY: &str = "tableName";

/// Outcome of a [`ResourceDataFactory::put`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The row was inserted or overwritten.
    Stored,
    /// The row was deleted (or was already absent).
    Deleted,
    /// The path cannot be written; nothing was changed.
    Rejected(Rejection),
}

/// Why a write was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The path does not address a row.
    WrongLevel { relative: String },
    /// The path names a table that is not supported.
    UnsupportedTable { table: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongLevel { relative } => {
                write!(f, "tried to add/update record on wrong level [{relative}]")
            }
            Rejection::UnsupportedTable { table } => {
                write!(f, "tried to add/update record in unsupported table [{table}]")
            }
        }
    }
}

struct TableEntry {
    store: TableStore,
    metadata: PropertyMap,
}

/// Resolves resource paths to rows of the supported tables.
///
/// Holds the shared connection for its whole lifetime but never opens or
/// closes it.
pub struct ResourceDataFactory {
    root: RootPath,
    tables: BTreeMap<Table, TableEntry>,
    closed: AtomicBool,
}

impl ResourceDataFactory {
    /// Creates a factory rooted at `root` and makes sure every supported
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ConfigError`](crate::SqliteError::ConfigError)
    /// for an empty root, or
    /// [`SqliteError::SchemaError`](crate::SqliteError::SchemaError) if a
    /// table cannot be created.
    pub fn new(conn: SharedConnection, root: impl Into<String>) -> Result<Self> {
        let root = RootPath::new(root)?;

        let mut tables = BTreeMap::new();
        for &table in Table::ALL {
            let store = TableStore::new(conn.clone(), table);
            store.ensure_schema()?;

            let mut metadata = PropertyMap::new();
            metadata.insert(
                TABLE_NAME_PROPERTY.to_string(),
                PropertyValue::from(table.descriptor().name),
            );
            tables.insert(table, TableEntry { store, metadata });
        }

        info!(root = %root, tables = tables.len(), "resource data factory ready");
        Ok(Self {
            root,
            tables,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the normalized root path.
    pub fn root(&self) -> &RootPath {
        &self.root
    }

    fn entry(&self, segment: &str) -> Option<&TableEntry> {
        Table::lookup(segment).and_then(|table| self.tables.get(&table))
    }

    /// Returns the static table-level resources, addressed under the root.
    pub fn table_resources(&self) -> Vec<Resource> {
        self.tables
            .iter()
            .map(|(table, entry)| {
                Resource::table(self.root.join(&table.segment()), entry.metadata.clone())
            })
            .collect()
    }

    /// Resolves `path` to a resource.
    ///
    /// Returns `Ok(None)` for unknown tables, missing rows, and paths at any
    /// other depth.
    pub fn get(&self, path: &str) -> Result<Option<Resource>> {
        let resolved = ResourcePath::resolve(&self.root, path);
        debug!(path, segments = ?resolved.segments(), "get");

        match resolved.target() {
            Target::Table(segment) => Ok(self
                .entry(segment)
                .map(|entry| Resource::table(path, entry.metadata.clone()))),
            Target::Row { table, key } => {
                let Some(entry) = self.entry(table) else {
                    return Ok(None);
                };
                Ok(entry
                    .store
                    .find_by_key(key)?
                    .map(|props| Resource::record(path, props)))
            }
            Target::Root | Target::Unmatched => Ok(None),
        }
    }

    /// Writes the row addressed by `path`.
    ///
    /// `Some(resource)` upserts the resource's properties; `None` deletes
    /// the row. Paths that do not address a row of a supported table are
    /// rejected with a warning.
    pub fn put(&self, path: &str, resource: Option<&Resource>) -> Result<PutOutcome> {
        let resolved = ResourcePath::resolve(&self.root, path);
        let Target::Row { table, key } = resolved.target() else {
            let relative = resolved.segments().join("/");
            warn!(path, relative = %relative, "tried to add/update record on wrong level");
            return Ok(PutOutcome::Rejected(Rejection::WrongLevel { relative }));
        };

        let Some(entry) = self.entry(table) else {
            let table = table.to_ascii_uppercase();
            warn!(path, table = %table, "tried to add/update record in unsupported table");
            return Ok(PutOutcome::Rejected(Rejection::UnsupportedTable { table }));
        };

        match resource {
            None => {
                entry.store.delete(key)?;
                info!(path, key, "deleted record");
                Ok(PutOutcome::Deleted)
            }
            Some(resource) => {
                entry.store.upsert(key, resource.properties())?;
                info!(path, key, "added/updated record");
                Ok(PutOutcome::Stored)
            }
        }
    }

    /// Lists the child paths of `path`.
    ///
    /// Only table paths have children: one path per stored row, formed by
    /// appending the key to `path`.
    pub fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let resolved = ResourcePath::resolve(&self.root, path);
        let Target::Table(segment) = resolved.target() else {
            return Ok(Vec::new());
        };
        let Some(entry) = self.entry(segment) else {
            return Ok(Vec::new());
        };

        let parent = path.trim_end_matches(SEPARATOR);
        let children = entry
            .store
            .list_keys()?
            .into_iter()
            .map(|key| format!("{parent}{SEPARATOR}{key}"))
            .collect();
        Ok(children)
    }

    /// Reports existence and row counts for every supported table.
    pub fn status(&self) -> Result<Vec<TableStatus>> {
        self.tables.values().map(|entry| entry.store.status()).collect()
    }

    /// Returns `true` until [`close`](Self::close) is called.
    pub fn is_live(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Marks the factory closed. The connection is left to its owner.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(root = %self.root, "resource data factory closed");
        }
    }
}

impl fmt::Debug for ResourceDataFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDataFactory")
            .field("root", &self.root)
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .field("live", &self.is_live())
            .finish()
    }
}
