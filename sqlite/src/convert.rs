//! Bidirectional mapping between SQL rows and property maps.
//!
//! Reading walks the descriptor's columns by name and places each value
//! under the column's lowercase property key. Writing produces the
//! positional parameters for an upsert in column order, filling in column
//! defaults for missing properties.
//!
//! # Coercion rules
//!
//! | column type | SQL value   | property value             |
//! |-------------|-------------|----------------------------|
//! | `VARCHAR`   | text        | string                     |
//! | `VARCHAR`   | integer     | decimal string             |
//! | `INTEGER`   | integer     | integer                    |
//! | `INTEGER`   | text        | integer if it parses, else error |
//! | `INTEGER`   | real        | integer if whole and in range, else error |
//! | any         | NULL        | omitted                    |

use rowtree_core::{Column, ColumnType, PropertyMap, PropertyValue, TableDescriptor};
use rusqlite::{Row, Rows};
use rusqlite::types::{Value, ValueRef};

use crate::error::{Result, SqliteError};

/// Converts one SQL value read from `column` into a property value.
///
/// Returns `None` for SQL NULL.
pub(crate) fn value_from_sql(
    column: &Column,
    value: ValueRef<'_>,
) -> Result<Option<PropertyValue>> {
    let converted = match (column.sql_type, value) {
        (_, ValueRef::Null) => return Ok(None),
        (ColumnType::Varchar(_), ValueRef::Text(bytes)) => {
            PropertyValue::String(utf8(column, bytes)?.to_string())
        }
        (ColumnType::Varchar(_), ValueRef::Integer(n)) => PropertyValue::String(n.to_string()),
        (ColumnType::Varchar(_), ValueRef::Real(f)) => PropertyValue::String(f.to_string()),
        (ColumnType::Integer, ValueRef::Integer(n)) => PropertyValue::Integer(n),
        (ColumnType::Integer, ValueRef::Text(bytes)) => {
            let text = utf8(column, bytes)?;
            let n = text.trim().parse::<i64>().map_err(|_| {
                SqliteError::ConversionError(format!(
                    "column {} holds non-integer value '{text}'",
                    column.name
                ))
            })?;
            PropertyValue::Integer(n)
        }
        (ColumnType::Integer, ValueRef::Real(f))
            if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) =>
        {
            PropertyValue::Integer(f as i64)
        }
        (_, other) => {
            return Err(SqliteError::ConversionError(format!(
                "column {} holds unsupported {:?} value",
                column.name,
                other.data_type()
            )));
        }
    };
    Ok(Some(converted))
}

fn utf8<'a>(column: &Column, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| {
        SqliteError::ConversionError(format!("column {} holds invalid UTF-8: {e}", column.name))
    })
}

/// Maps a result row onto a property map keyed by lowercase property names.
pub(crate) fn row_to_properties(desc: &TableDescriptor, row: &Row<'_>) -> Result<PropertyMap> {
    let mut props = PropertyMap::new();
    for column in desc.columns {
        let value = row.get_ref(column.name)?;
        if let Some(value) = value_from_sql(column, value)? {
            props.insert(column.property.to_string(), value);
        }
    }
    Ok(props)
}

/// Maps the first row of a result set, or returns an empty map if the
/// result set has no rows.
pub(crate) fn first_row_properties(
    desc: &TableDescriptor,
    rows: &mut Rows<'_>,
) -> Result<PropertyMap> {
    match rows.next()? {
        Some(row) => row_to_properties(desc, row),
        None => Ok(PropertyMap::new()),
    }
}

/// Builds upsert parameters in column order: the key, then every value
/// column with its default applied when the property is missing.
///
/// A `userid`-style key property inside `props` is ignored; the key passed
/// in always wins.
///
/// # Errors
///
/// Returns [`SqliteError::ConversionError`] if an integer column receives
/// a value that cannot be read as an integer.
pub(crate) fn properties_to_parameters(
    desc: &TableDescriptor,
    key: &str,
    props: &PropertyMap,
) -> Result<Vec<Value>> {
    let mut params = Vec::with_capacity(desc.columns.len());
    params.push(Value::Text(key.to_string()));

    for column in desc.value_columns() {
        let value = props
            .get(column.property)
            .cloned()
            .or_else(|| column.default.map(|d| d.to_value()));

        let param = match (column.sql_type, value) {
            (_, None) => Value::Null,
            (ColumnType::Varchar(_), Some(value)) => Value::Text(value.to_text()),
            (ColumnType::Integer, Some(value)) => match value.coerce_integer() {
                Some(n) => Value::Integer(n),
                None => {
                    return Err(SqliteError::ConversionError(format!(
                        "property '{}' must be an integer, got '{value}'",
                        column.property
                    )));
                }
            },
        };
        params.push(param);
    }

    Ok(params)
}
