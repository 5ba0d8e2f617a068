//! Generic value model for resources backed by table rows.
//!
//! A row is represented as a [`PropertyMap`] of lowercase field names to
//! scalar [`PropertyValue`]s. A [`Resource`] pairs such a map with the path
//! it was read from and whether it is a table-level or row-level node.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar property value.
///
/// Serializes untagged, so JSON `"Ann"` and `10` map directly onto
/// [`PropertyValue::String`] and [`PropertyValue::Integer`].
///
/// # Examples
///
/// ```
/// use rowtree_core::PropertyValue;
///
/// assert_eq!(PropertyValue::from("42").coerce_integer(), Some(42));
/// assert_eq!(PropertyValue::from(42).to_text(), "42");
/// assert_eq!(PropertyValue::from("n/a").coerce_integer(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    String(String),
}

impl PropertyValue {
    /// Returns the string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            PropertyValue::Integer(_) => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            PropertyValue::String(_) => None,
        }
    }

    /// Renders the value as text; integers become decimal strings.
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(n) => n.to_string(),
        }
    }

    /// Reads the value as an integer, parsing strings when they hold one.
    pub fn coerce_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            PropertyValue::String(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

/// Field name to value mapping for one resource.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Whether a resource is a table node or a row node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Table-level node; carries only the table name.
    Table,
    /// Row-level node; carries the row's fields.
    Record,
}

/// A resource in the tree.
///
/// # Examples
///
/// ```
/// use rowtree_core::{PropertyMap, Resource, ResourceKind};
///
/// let mut props = PropertyMap::new();
/// props.insert("name".into(), "Ann".into());
///
/// let resource = Resource::record("/x/accounts/u1", props);
/// assert_eq!(resource.kind, ResourceKind::Record);
/// assert_eq!(resource.get("name").and_then(|v| v.as_str()), Some("Ann"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Absolute path the resource was addressed by.
    pub path: String,
    /// Node kind.
    pub kind: ResourceKind,
    /// Metadata of the node.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Resource {
    /// Creates a table-level resource.
    pub fn table(path: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::Table,
            properties,
        }
    }

    /// Creates a row-level resource.
    pub fn record(path: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::Record,
            properties,
        }
    }

    /// Returns the property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Looks up a single property.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}
