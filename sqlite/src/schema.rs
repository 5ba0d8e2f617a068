//! SQL generation from table descriptors.
//!
//! Every statement issued against a supported table is derived from its
//! static [`TableDescriptor`]. Identifiers are never taken from request
//! paths; row keys and values are always bound as positional parameters.
//!
//! For the accounts table this yields:
//!
//! ```text
//! CREATE TABLE IF NOT EXISTS ACCOUNTS (
//!     USERID VARCHAR(63) NOT NULL PRIMARY KEY,
//!     NAME VARCHAR(255),
//!     EMAIL VARCHAR(255),
//!     BALANCE INTEGER
//! );
//! ```

use rowtree_core::TableDescriptor;

/// Generates the idempotent `CREATE TABLE IF NOT EXISTS` statement.
///
/// SQLite accepts NULL in non-integer primary keys unless the column is
/// declared `NOT NULL`, so the key column carries it explicitly.
pub fn generate_schema_sql(desc: &TableDescriptor) -> String {
    let key = desc.key();
    let columns: Vec<String> = desc
        .columns
        .iter()
        .map(|column| {
            if column == key {
                format!("    {} {} NOT NULL PRIMARY KEY", column.name, column.sql_type.sql())
            } else {
                format!("    {} {}", column.name, column.sql_type.sql())
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n);",
        table = desc.name,
        columns = columns.join(",\n")
    )
}

/// Point select of all mapped columns by primary key (`?1`).
pub(crate) fn select_by_key_sql(desc: &TableDescriptor) -> String {
    format!(
        "SELECT {columns} FROM {table} WHERE {key} = ?1",
        columns = desc.column_list(),
        table = desc.name,
        key = desc.key().name
    )
}

/// Insert-or-overwrite of one row with parameters in column order.
pub(crate) fn upsert_sql(desc: &TableDescriptor) -> String {
    let placeholders: Vec<String> = (1..=desc.columns.len()).map(|i| format!("?{i}")).collect();
    let assignments: Vec<String> = desc
        .value_columns()
        .iter()
        .map(|c| format!("{name} = excluded.{name}", name = c.name))
        .collect();

    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT({key}) DO UPDATE SET {assignments}",
        table = desc.name,
        columns = desc.column_list(),
        placeholders = placeholders.join(", "),
        key = desc.key().name,
        assignments = assignments.join(", ")
    )
}

/// Delete by primary key (`?1`).
pub(crate) fn delete_sql(desc: &TableDescriptor) -> String {
    format!(
        "DELETE FROM {table} WHERE {key} = ?1",
        table = desc.name,
        key = desc.key().name
    )
}

/// Unparameterized select of every key.
pub(crate) fn list_keys_sql(desc: &TableDescriptor) -> String {
    format!(
        "SELECT {key} FROM {table}",
        key = desc.key().name,
        table = desc.name
    )
}

/// Row count of the table.
pub(crate) fn count_sql(desc: &TableDescriptor) -> String {
    format!("SELECT COUNT(*) FROM {}", desc.name)
}
