//! Resolution of incoming resource paths against the provider root.
//!
//! A provider is mounted at a [`RootPath`]. Every incoming path is made
//! relative to that root and split into `/`-delimited segments; the number
//! of segments decides what the path addresses:
//!
//! | segments | target                  |
//! |----------|-------------------------|
//! | 0        | [`Target::Root`]        |
//! | 1        | [`Target::Table`]       |
//! | 2        | [`Target::Row`]         |
//! | more     | [`Target::Unmatched`]   |
//!
//! Paths that do not start with the root are taken to be relative already.

use std::fmt;

use crate::error::{CoreError, Result};

/// Path separator used for resource paths.
pub const SEPARATOR: char = '/';

/// Root of the subtree a provider is responsible for.
///
/// Always ends with [`SEPARATOR`].
///
/// # Examples
///
/// ```
/// use rowtree_core::RootPath;
///
/// assert_eq!(RootPath::new("/x").unwrap().as_str(), "/x/");
/// assert_eq!(RootPath::new("/x/").unwrap().as_str(), "/x/");
/// assert!(RootPath::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootPath(String);

impl RootPath {
    /// Creates a root path, appending a trailing separator when missing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyRoot`] if `raw` is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let mut raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::EmptyRoot);
        }
        if !raw.ends_with(SEPARATOR) {
            raw.push(SEPARATOR);
        }
        Ok(Self(raw))
    }

    /// Returns the root including its trailing separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a relative path onto the root.
    pub fn join(&self, relative: &str) -> String {
        format!("{}{}", self.0, relative.trim_start_matches(SEPARATOR))
    }

    fn without_separator(&self) -> &str {
        &self.0[..self.0.len() - SEPARATOR.len_utf8()]
    }
}

impl fmt::Display for RootPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path split into segments relative to a [`RootPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Resolves `full` against `root`.
    ///
    /// The root is stripped once as a literal prefix. A path that does not
    /// start with the root passes through unchanged, so resolving a relative
    /// path gives the same segments as resolving its absolute form. Trailing
    /// separators are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowtree_core::{ResourcePath, RootPath};
    ///
    /// let root = RootPath::new("/x/").unwrap();
    /// let absolute = ResourcePath::resolve(&root, "/x/accounts/u1");
    /// let relative = ResourcePath::resolve(&root, "accounts/u1");
    /// assert_eq!(absolute, relative);
    /// assert_eq!(absolute.len(), 2);
    /// ```
    pub fn resolve(root: &RootPath, full: &str) -> Self {
        let relative = if full == root.without_separator() {
            ""
        } else {
            full.strip_prefix(root.as_str()).unwrap_or(full)
        };

        let relative = relative.trim_end_matches(SEPARATOR);
        let segments = if relative.is_empty() {
            Vec::new()
        } else {
            relative.split(SEPARATOR).map(String::from).collect()
        };

        Self { segments }
    }

    /// Returns the resolved segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path addresses the root itself.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Classifies the path by its segment count.
    pub fn target(&self) -> Target<'_> {
        match self.segments.as_slice() {
            [] => Target::Root,
            [table] => Target::Table(table),
            [table, key] => Target::Row { table, key },
            _ => Target::Unmatched,
        }
    }
}

/// What a [`ResourcePath`] addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The provider root.
    Root,
    /// A table-level node, by its raw segment.
    Table(&'a str),
    /// A single row, by raw table segment and row key.
    Row { table: &'a str, key: &'a str },
    /// Deeper than a row; nothing lives here.
    Unmatched,
}
