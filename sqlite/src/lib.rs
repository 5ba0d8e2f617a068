//! SQLite storage backend for the rowtree resource tree.
//!
//! This crate maps resource paths onto SQL statements against the tables
//! described in [`rowtree_core::Table`], and maps result rows back into
//! [`rowtree_core::Resource`] values.
//!
//! # Architecture
//!
//! The crate is organized into four modules:
//!
//! - **`schema`** — SQL generation from static table descriptors
//! - **`convert`** — SQL row ↔ property map coercion
//! - **`store`** — statement execution for one table ([`TableStore`])
//! - **`facade`** — path-addressed get/put/list ([`ResourceDataFactory`])
//!
//! # Quick start
//!
//! ```no_run
//! use rowtree_sqlite::{ResourceDataFactory, share};
//! use rusqlite::Connection;
//!
//! let conn = share(Connection::open("accounts.db").unwrap());
//! let factory = ResourceDataFactory::new(conn, "/accounts-root/").unwrap();
//!
//! for child in factory.list_children("/accounts-root/accounts").unwrap() {
//!     if let Some(row) = factory.get(&child).unwrap() {
//!         println!("{child}: {:?}", row.properties());
//!     }
//! }
//! ```
//!
//! # Connection ownership
//!
//! The caller opens the connection and wraps it with [`share`]. Stores and
//! the factory only issue statements on it; closing it is left to whoever
//! holds the last [`SharedConnection`].

mod convert;
mod error;
mod facade;
mod schema;
mod store;

pub use error::{Result, SqliteError};
pub use facade::{PutOutcome, Rejection, ResourceDataFactory, TABLE_NAME_PROPERTY};
pub use schema::generate_schema_sql;
pub use store::{SharedConnection, TableStatus, TableStore, share};
