//! Document model shared by discovery and profiling.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// One semi-structured record.
///
/// Objects keep their keys in source order. The engine only ever reads
/// documents; nothing here is mutated during a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Object(Vec<(String, Document)>),
    Array(Vec<Document>),
    Scalar(Scalar),
}

/// Leaf values, including database-native types that have no JSON
/// counterpart.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
    /// A database-native object identifier (hex string form).
    ObjectId(String),
    /// Any other native type, e.g. `datetime`, `binary`, `decimal128`.
    ///
    /// `type_name` is reported verbatim by the classifier.
    Other { type_name: String, value: String },
}

impl Document {
    pub fn null() -> Self {
        Document::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Document::Scalar(Scalar::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Document::Scalar(Scalar::Int(i128::from(value)))
    }

    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Document)>,
    {
        Document::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(items: impl IntoIterator<Item = Document>) -> Self {
        Document::Array(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Scalar(Scalar::Null))
    }

    /// Objects and arrays; the only values traversal descends into.
    pub fn is_container(&self) -> bool {
        matches!(self, Document::Object(_) | Document::Array(_))
    }
}

impl From<Scalar> for Document {
    fn from(value: Scalar) -> Self {
        Document::Scalar(value)
    }
}

/// Dot-joined chain of object keys, independent of array position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        FieldPath(path.into())
    }

    /// `prefix.key`, or just `key` when there is no (or an empty) prefix.
    pub fn join(prefix: Option<&str>, key: &str) -> Self {
        match prefix {
            Some(p) if !p.is_empty() => FieldPath(format!("{p}.{key}")),
            _ => FieldPath(key.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of object keys in the path (`a.b` is depth 2).
    pub fn depth(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.split('.').count()
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath(value.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath(value)
    }
}
