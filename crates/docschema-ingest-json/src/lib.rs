//! JSON document sources for docschema
//!
//! Turns JSON exports of a document collection into [`Document`] values:
//! - JSON Lines / concatenated JSON values (one document each)
//! - a top-level JSON array of documents
//! - MongoDB Extended JSON markers (`{"$oid": ..}`, `{"$date": ..}`, ...)
//!   mapped to native scalar types
//!
//! Sources are plain iterators of `Result<Document, SourceError>` and are
//! consumed lazily, one document at a time.

use docschema_profile::{Document, Scalar};
use serde_json::Value;
use std::io;

pub mod extended;
pub mod files;
pub mod reader;

pub use extended::extended_scalar;
pub use files::{collect_input_files, DocumentFiles};
pub use reader::{InputFormat, JsonDocuments};

/// Whether `$`-marker objects are read as native types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtendedJson {
    #[default]
    Recognise,
    /// Keep every JSON object as an object.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub format: InputFormat,
    pub extended_json: ExtendedJson,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {origin} at line {line}: {source}")]
    Json {
        origin: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("no JSON input files found in {0}")]
    NoInputs(String),
}

/// Convert a parsed JSON value into a document.
pub fn to_document(value: Value, mode: ExtendedJson) -> Document {
    match value {
        Value::Null => Document::Scalar(Scalar::Null),
        Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Document::Scalar(number_scalar(&n)),
        Value::String(s) => Document::Scalar(Scalar::String(s)),
        Value::Array(items) => {
            Document::Array(items.into_iter().map(|v| to_document(v, mode)).collect())
        }
        Value::Object(map) => {
            if mode == ExtendedJson::Recognise {
                if let Some(scalar) = extended_scalar(&map) {
                    return Document::Scalar(scalar);
                }
            }
            Document::Object(
                map.into_iter()
                    .map(|(k, v)| (k, to_document(v, mode)))
                    .collect(),
            )
        }
    }
}

fn number_scalar(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        Scalar::Int(i128::from(u))
    } else if let Some(f) = n.as_f64() {
        Scalar::Float(f)
    } else {
        Scalar::Other {
            type_name: "number".to_string(),
            value: n.to_string(),
        }
    }
}
