//! Value-kind labels used in type distributions.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::document::{Document, Scalar};

pub const NULL: &str = "null";
pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const NUMBER: &str = "number";
pub const STRING: &str = "string";
pub const OBJECT_ID: &str = "objectId";
pub const OBJECT: &str = "object";
pub const ARRAY: &str = "array";

/// How numeric values are labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberLabels {
    /// `int` and `float`.
    #[default]
    Split,
    /// A single `number` label for both.
    Unified,
}

/// Maps one value to its label.
///
/// Stateless apart from the numeric labelling mode; call it once per
/// occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeClassifier {
    numbers: NumberLabels,
}

impl TypeClassifier {
    pub fn new(numbers: NumberLabels) -> Self {
        Self { numbers }
    }

    /// Label for `value`. Native types without a dedicated label report
    /// their own type name.
    pub fn label<'a>(&self, value: &'a Document) -> Cow<'a, str> {
        let label = match value {
            Document::Object(_) => OBJECT,
            Document::Array(_) => ARRAY,
            Document::Scalar(scalar) => match scalar {
                Scalar::Null => NULL,
                Scalar::Bool(_) => BOOL,
                Scalar::Int(_) => match self.numbers {
                    NumberLabels::Split => INT,
                    NumberLabels::Unified => NUMBER,
                },
                Scalar::Float(_) => match self.numbers {
                    NumberLabels::Split => FLOAT,
                    NumberLabels::Unified => NUMBER,
                },
                Scalar::String(_) => STRING,
                Scalar::ObjectId(_) => OBJECT_ID,
                Scalar::Other { type_name, .. } => return Cow::Borrowed(type_name.as_str()),
            },
        };
        Cow::Borrowed(label)
    }
}

/// Label with the default (split) numeric mode.
pub fn type_label(value: &Document) -> Cow<'_, str> {
    TypeClassifier::default().label(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn other(type_name: &str) -> Document {
        Document::Scalar(Scalar::Other {
            type_name: type_name.to_string(),
            value: String::new(),
        })
    }

    #[test]
    fn labels_every_kind() {
        assert_eq!(type_label(&Document::null()), "null");
        assert_eq!(type_label(&Document::Scalar(Scalar::Bool(true))), "bool");
        assert_eq!(type_label(&Document::int(3)), "int");
        assert_eq!(type_label(&Document::Scalar(Scalar::Float(1.5))), "float");
        assert_eq!(type_label(&Document::string("x")), "string");
        assert_eq!(
            type_label(&Document::Scalar(Scalar::ObjectId(
                "507f1f77bcf86cd799439011".to_string()
            ))),
            "objectId"
        );
        assert_eq!(type_label(&Document::object([("a", Document::int(1))])), "object");
        assert_eq!(type_label(&Document::array([])), "array");
    }

    #[test]
    fn native_types_fall_back_to_their_name() {
        assert_eq!(type_label(&other("datetime")), "datetime");
        assert_eq!(type_label(&other("decimal128")), "decimal128");
    }

    #[test]
    fn unified_numbers_share_one_label() {
        let classifier = TypeClassifier::new(NumberLabels::Unified);
        assert_eq!(classifier.label(&Document::int(1)), "number");
        assert_eq!(classifier.label(&Document::Scalar(Scalar::Float(0.5))), "number");
        assert_eq!(classifier.label(&Document::Scalar(Scalar::Bool(false))), "bool");
    }
}
