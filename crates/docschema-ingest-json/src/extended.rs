//! MongoDB Extended JSON markers.
//!
//! Only well-formed markers are recognised. Anything else (extra keys, wrong
//! payload shape) stays a plain object, so user data that happens to use a
//! `$` key is never lost.

use docschema_profile::Scalar;
use serde_json::{Map, Value};

/// Native scalar encoded by `map`, if it is an Extended JSON marker.
pub fn extended_scalar(map: &Map<String, Value>) -> Option<Scalar> {
    match map.len() {
        1 => {
            let (key, payload) = map.iter().next()?;
            single_key_marker(key, payload)
        }
        2 => two_key_marker(map),
        _ => None,
    }
}

fn single_key_marker(key: &str, payload: &Value) -> Option<Scalar> {
    match (key, payload) {
        ("$oid", Value::String(hex)) => Some(Scalar::ObjectId(hex.clone())),
        ("$numberInt" | "$numberLong", Value::String(s)) => s.parse().ok().map(Scalar::Int),
        ("$numberDouble", Value::String(s)) => s.parse().ok().map(Scalar::Float),
        ("$numberDecimal", Value::String(_)) => Some(other("decimal128", payload)),
        ("$date", Value::String(_) | Value::Number(_)) => Some(other("datetime", payload)),
        ("$date", Value::Object(inner)) if inner.contains_key("$numberLong") => {
            Some(other("datetime", payload))
        }
        ("$binary", Value::Object(inner)) if inner.contains_key("base64") => {
            Some(other("binary", payload))
        }
        ("$timestamp", Value::Object(inner))
            if inner.contains_key("t") && inner.contains_key("i") =>
        {
            Some(other("timestamp", payload))
        }
        ("$regularExpression", Value::Object(inner)) if inner.contains_key("pattern") => {
            Some(other("regex", payload))
        }
        ("$uuid", Value::String(_)) => Some(other("uuid", payload)),
        ("$symbol", Value::String(_)) => Some(other("symbol", payload)),
        ("$code", Value::String(_)) => Some(other("javascript", payload)),
        ("$minKey", Value::Number(_)) => Some(other("minKey", payload)),
        ("$maxKey", Value::Number(_)) => Some(other("maxKey", payload)),
        ("$undefined", Value::Bool(true)) => Some(other("undefined", payload)),
        ("$dbPointer", Value::Object(_)) => Some(other("dbPointer", payload)),
        _ => None,
    }
}

/// Legacy (v1) two-key forms.
fn two_key_marker(map: &Map<String, Value>) -> Option<Scalar> {
    let has = |a: &str, b: &str| map.contains_key(a) && map.contains_key(b);
    let payload = Value::Object(map.clone());
    if has("$binary", "$type") {
        Some(other("binary", &payload))
    } else if has("$regex", "$options") {
        Some(other("regex", &payload))
    } else if has("$code", "$scope") {
        Some(other("javascriptWithScope", &payload))
    } else {
        None
    }
}

fn other(type_name: &str, payload: &Value) -> Scalar {
    Scalar::Other {
        type_name: type_name.to_string(),
        value: payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marker(value: Value) -> Option<Scalar> {
        match value {
            Value::Object(map) => extended_scalar(&map),
            _ => None,
        }
    }

    fn type_name(scalar: Option<Scalar>) -> Option<String> {
        match scalar {
            Some(Scalar::Other { type_name, .. }) => Some(type_name),
            _ => None,
        }
    }

    #[test]
    fn object_ids_and_numbers() {
        assert_eq!(
            marker(json!({"$oid": "507f1f77bcf86cd799439011"})),
            Some(Scalar::ObjectId("507f1f77bcf86cd799439011".to_string()))
        );
        assert_eq!(marker(json!({"$numberLong": "-42"})), Some(Scalar::Int(-42)));
        assert_eq!(marker(json!({"$numberInt": "5"})), Some(Scalar::Int(5)));
        assert_eq!(marker(json!({"$numberDouble": "1.5"})), Some(Scalar::Float(1.5)));
    }

    #[test]
    fn native_types_keep_their_name() {
        assert_eq!(
            type_name(marker(json!({"$date": "2024-01-01T00:00:00Z"}))).as_deref(),
            Some("datetime")
        );
        assert_eq!(
            type_name(marker(json!({"$date": {"$numberLong": "1700000000000"}}))).as_deref(),
            Some("datetime")
        );
        assert_eq!(
            type_name(marker(json!({"$numberDecimal": "1.10"}))).as_deref(),
            Some("decimal128")
        );
        assert_eq!(
            type_name(marker(json!({"$binary": {"base64": "AA==", "subType": "00"}}))).as_deref(),
            Some("binary")
        );
        assert_eq!(
            type_name(marker(json!({"$timestamp": {"t": 1, "i": 2}}))).as_deref(),
            Some("timestamp")
        );
        assert_eq!(
            type_name(marker(json!({"$regex": "^a", "$options": "i"}))).as_deref(),
            Some("regex")
        );
    }

    #[test]
    fn malformed_markers_are_not_recognised() {
        assert_eq!(marker(json!({"$oid": 12})), None);
        assert_eq!(marker(json!({"$numberLong": "twelve"})), None);
        assert_eq!(marker(json!({"$oid": "abc", "name": "x"})), None);
        assert_eq!(marker(json!({"$price": "10"})), None);
        assert_eq!(marker(json!({})), None);
    }
}
