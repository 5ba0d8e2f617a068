//! Statement execution against a single supported table.
//!
//! A [`TableStore`] pairs a [`Table`] with a [`SharedConnection`] handed in
//! by the caller. It keeps no other state: every call runs its statements
//! directly against the database, holding the connection lock for the
//! duration of the call.
//!
//! Failures are logged here and returned to the caller. A missing row is
//! `Ok(None)`, never an error.

use std::sync::{Arc, Mutex};

use rowtree_core::{PropertyMap, Table, TableDescriptor};
use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;
use tracing::{debug, error};

use crate::convert;
use crate::error::{Result, SqliteError};
use crate::schema;

/// A connection shared between the owner of its lifetime and the stores
/// that issue statements on it.
///
/// `rusqlite::Connection` cannot be used from two threads at once, so all
/// statement execution goes through the mutex.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Wraps an open connection for sharing.
pub fn share(conn: Connection) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}

/// Snapshot of a table's existence and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    /// SQL table name.
    pub table: &'static str,
    /// Whether the table exists in the database.
    pub table_exists: bool,
    /// Number of rows stored (0 when the table does not exist).
    pub row_count: usize,
}

/// Executes SQL for one logical table.
#[derive(Debug, Clone)]
pub struct TableStore {
    conn: SharedConnection,
    table: Table,
}

impl TableStore {
    /// Creates a store for `table` over a shared connection.
    pub fn new(conn: SharedConnection, table: Table) -> Self {
        Self { conn, table }
    }

    fn descriptor(&self) -> &'static TableDescriptor {
        self.table.descriptor()
    }

    /// Runs `f` with the connection locked, logging any failure.
    fn with_conn<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let guard = self.conn.lock().map_err(|_| {
            error!(table = self.descriptor().name, op, "connection lock poisoned");
            SqliteError::ConnectionPoisoned
        })?;
        f(&*guard).inspect_err(|e| {
            error!(table = self.descriptor().name, op, error = %e, "failed to talk to database");
        })
    }

    /// Creates the table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::SchemaError`] if the statement is rejected.
    pub fn ensure_schema(&self) -> Result<()> {
        let sql = schema::generate_schema_sql(self.descriptor());
        self.with_conn("ensure_schema", |conn| {
            conn.execute_batch(&sql).map_err(|e| {
                SqliteError::SchemaError(format!(
                    "failed to create table {}: {e}",
                    self.descriptor().name
                ))
            })
        })
    }

    /// Loads the row with the given key.
    ///
    /// Returns `Ok(None)` if no row matched.
    pub fn find_by_key(&self, key: &str) -> Result<Option<PropertyMap>> {
        let desc = self.descriptor();
        let props = self.with_conn("find_by_key", |conn| {
            let mut stmt = conn.prepare(&schema::select_by_key_sql(desc))?;
            let mut rows = stmt.query(params![key])?;
            convert::first_row_properties(desc, &mut rows)
        })?;

        debug!(table = desc.name, key, found = !props.is_empty(), "point lookup");
        Ok((!props.is_empty()).then_some(props))
    }

    /// Inserts the row, or overwrites every value column if the key exists.
    ///
    /// Missing properties are written as column defaults.
    pub fn upsert(&self, key: &str, props: &PropertyMap) -> Result<()> {
        let desc = self.descriptor();
        let values = convert::properties_to_parameters(desc, key, props)?;
        self.with_conn("upsert", |conn| {
            conn.execute(&schema::upsert_sql(desc), params_from_iter(values.iter()))?;
            Ok(())
        })
    }

    /// Deletes the row with the given key. Deleting a missing key succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        let desc = self.descriptor();
        let affected = self.with_conn("delete", |conn| {
            Ok(conn.execute(&schema::delete_sql(desc), params![key])?)
        })?;
        debug!(table = desc.name, key, affected, "delete");
        Ok(())
    }

    /// Returns every key in the table, in no particular order.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let desc = self.descriptor();
        self.with_conn("list_keys", |conn| {
            let mut stmt = conn.prepare(&schema::list_keys_sql(desc))?;
            let mut rows = stmt.query([])?;
            let key_column = desc.key();

            let mut keys = Vec::new();
            while let Some(row) = rows.next()? {
                if let Some(key) = convert::value_from_sql(key_column, row.get_ref(0)?)? {
                    keys.push(key.to_text());
                }
            }
            Ok(keys)
        })
    }

    /// Reports whether the table exists and how many rows it holds.
    pub fn status(&self) -> Result<TableStatus> {
        let desc = self.descriptor();
        self.with_conn("status", |conn| {
            let exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![desc.name],
                |row| row.get(0),
            )?;

            let row_count = if exists > 0 {
                let count: i64 = conn.query_row(&schema::count_sql(desc), [], |row| row.get(0))?;
                count as usize
            } else {
                0
            };

            Ok(TableStatus {
                table: desc.name,
                table_exists: exists > 0,
                row_count,
            })
        })
    }
}
