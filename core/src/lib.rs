//! Core types for exposing a SQL table as a resource tree.
//!
//! This crate defines the storage-independent half of rowtree:
//!
//! - [`RootPath`] and [`ResourcePath`] — resolving an incoming path against
//!   the configured root into segments, and classifying it as a
//!   [`Target`] (root, table, row, or unmatched).
//! - [`Table`] and [`TableDescriptor`] — the closed set of supported tables
//!   and their column layout, looked up case-insensitively by path segment.
//! - [`PropertyValue`], [`PropertyMap`], and [`Resource`] — the generic
//!   value model that rows are mapped into.
//!
//! # Example
//!
//! ```
//! use rowtree_core::{ResourcePath, RootPath, Table, Target};
//!
//! let root = RootPath::new("/accounts-root").unwrap();
//! assert_eq!(root.as_str(), "/accounts-root/");
//!
//! let path = ResourcePath::resolve(&root, "/accounts-root/ACCOUNTS/u1");
//! assert_eq!(path.segments(), ["ACCOUNTS", "u1"]);
//!
//! match path.target() {
//!     Target::Row { table, key } => {
//!         assert_eq!(Table::lookup(table), Some(Table::Accounts));
//!         assert_eq!(key, "u1");
//!     }
//!     other => panic!("unexpected target: {other:?}"),
//! }
//! ```

mod error;
mod path;
mod table;
mod types;

pub use error::{CoreError, Result};
pub use path::{ResourcePath, RootPath, SEPARATOR, Target};
pub use table::{Column, ColumnDefault, ColumnType, Table, TableDescriptor};
pub use types::{PropertyMap, PropertyValue, Resource, ResourceKind};
