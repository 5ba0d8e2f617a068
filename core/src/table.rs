//! Supported tables and their column layout.
//!
//! Tables form a closed set: each [`Table`] variant maps to a static
//! [`TableDescriptor`] naming the SQL table, its key column, and the columns
//! that are mapped into resource properties. Path segments are matched
//! against table names case-insensitively through [`Table::lookup`].

use crate::types::PropertyValue;

/// SQL type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Variable-length text with a maximum length.
    Varchar(u16),
    /// Integer value.
    Integer,
}

impl ColumnType {
    /// Returns the SQL type declaration.
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Integer => "INTEGER".to_string(),
        }
    }
}

/// Value written for a column when the property map omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Text(&'static str),
    Integer(i64),
}

impl ColumnDefault {
    /// Converts the default into a property value.
    pub fn to_value(self) -> PropertyValue {
        match self {
            ColumnDefault::Text(text) => PropertyValue::String(text.to_string()),
            ColumnDefault::Integer(n) => PropertyValue::Integer(n),
        }
    }
}

/// A column of a supported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// SQL column name (uppercase).
    pub name: &'static str,
    /// Property key the column maps to (lowercase).
    pub property: &'static str,
    /// SQL type.
    pub sql_type: ColumnType,
    /// Default applied on write when the property is missing. `None` for
    /// the key column, whose value always comes from the path.
    pub default: Option<ColumnDefault>,
}

/// Static description of a supported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// SQL table name (uppercase).
    pub name: &'static str,
    /// All columns in declaration order. The first column is the primary key.
    pub columns: &'static [Column],
}

impl TableDescriptor {
    /// Returns the key column definition.
    pub fn key(&self) -> &'static Column {
        &self.columns[0]
    }

    /// Returns the non-key columns in declaration order.
    pub fn value_columns(&self) -> &'static [Column] {
        &self.columns[1..]
    }

    /// Returns the column names joined with `", "`.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

static ACCOUNTS: TableDescriptor = TableDescriptor {
    name: "ACCOUNTS",
    columns: &[
        Column {
            name: "USERID",
            property: "userid",
            sql_type: ColumnType::Varchar(63),
            default: None,
        },
        Column {
            name: "NAME",
            property: "name",
            sql_type: ColumnType::Varchar(255),
            default: Some(ColumnDefault::Text("[no name]")),
        },
        Column {
            name: "EMAIL",
            property: "email",
            sql_type: ColumnType::Varchar(255),
            default: Some(ColumnDefault::Text("[no email]")),
        },
        Column {
            name: "BALANCE",
            property: "balance",
            sql_type: ColumnType::Integer,
            default: Some(ColumnDefault::Integer(0)),
        },
    ],
};

/// A table exposed through the resource tree.
///
/// # Examples
///
/// ```
/// use rowtree_core::Table;
///
/// assert_eq!(Table::lookup("accounts"), Some(Table::Accounts));
/// assert_eq!(Table::lookup("Accounts"), Some(Table::Accounts));
/// assert_eq!(Table::lookup("other"), None);
/// assert_eq!(Table::Accounts.descriptor().name, "ACCOUNTS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Accounts,
}

impl Table {
    /// Every supported table.
    pub const ALL: &'static [Table] = &[Table::Accounts];

    /// Returns the static descriptor for this table.
    pub fn descriptor(self) -> &'static TableDescriptor {
        match self {
            Table::Accounts => &ACCOUNTS,
        }
    }

    /// Finds the table whose name matches `segment`, ignoring ASCII case.
    pub fn lookup(segment: &str) -> Option<Table> {
        Self::ALL
            .iter()
            .copied()
            .find(|table| table.descriptor().name.eq_ignore_ascii_case(segment))
    }

    /// Returns the lowercase path segment for this table.
    pub fn segment(self) -> String {
        self.descriptor().name.to_ascii_lowercase()
    }
}
