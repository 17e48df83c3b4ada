//! Textual serialization of redacted output.
//!
//! Mapping keys serialize in insertion order (serde_json's `preserve_order`
//! feature); output ordering equals input ordering end to end.
//!
//! Conversion to `serde_json::Value` follows JSON-stringify conventions for
//! the plain kinds: `Undefined` and `Callable` entries are dropped from
//! mappings and become `null` in sequences; non-finite numbers become
//! `null`. Any structured kind reaching this layer unconverted means no
//! transformer was registered for it; that is an [`Error::Unserializable`],
//! surfaced as-is to the caller.

use serde_json::{Map, Number, Value as JsonValue};

use crate::{error::Error, value::Value};

/// Serializes a redacted value to JSON text.
pub fn to_text(value: &Value) -> Result<String, Error> {
    let json = to_json_value(value)?;
    // A JSON value converted from `Value` cannot fail to stringify.
    Ok(json.to_string())
}

/// Converts a redacted value into a `serde_json::Value`.
pub fn to_json_value(value: &Value) -> Result<JsonValue, Error> {
    match value {
        Value::Null | Value::Undefined | Value::Callable(_) => Ok(JsonValue::Null),
        Value::Bool(flag) => Ok(JsonValue::Bool(*flag)),
        Value::Int(number) => Ok(JsonValue::Number(Number::from(*number))),
        Value::Float(number) => Ok(Number::from_f64(*number)
            .map_or(JsonValue::Null, JsonValue::Number)),
        Value::String(text) => Ok(JsonValue::String(text.clone())),
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.borrow().len());
            for item in items.borrow().iter() {
                out.push(to_json_value(item)?);
            }
            Ok(JsonValue::Array(out))
        }
        Value::Object(entries) => {
            let mut out = Map::new();
            for (key, item) in entries.borrow().iter() {
                // JSON-stringify convention: absent and callable entries are
                // omitted from mappings.
                if matches!(item, Value::Undefined | Value::Callable(_)) {
                    continue;
                }
                out.insert(key.clone(), to_json_value(item)?);
            }
            Ok(JsonValue::Object(out))
        }
        Value::BigInt(_)
        | Value::Date(_)
        | Value::Error(_)
        | Value::Regex(_)
        | Value::Url(_)
        | Value::Map(_)
        | Value::Set(_)
        | Value::Circular(_) => Err(Error::Unserializable { kind: value.kind() }),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn plain_values_serialize_in_order() {
        let value = Value::object(vec![
            ("b", Value::from(1)),
            ("a", Value::sequence(vec![Value::from("x"), Value::Null])),
        ]);
        assert_eq!(
            to_text(&value).expect("serializable"),
            r#"{"b":1,"a":["x",null]}"#
        );
    }

    #[test]
    fn undefined_and_callables_follow_stringify_conventions() {
        let value = Value::object(vec![
            ("gone", Value::Undefined),
            ("f", Value::Callable("handler".into())),
            ("kept", Value::from(true)),
            (
                "list",
                Value::sequence(vec![Value::Undefined, Value::from(1)]),
            ),
        ]);
        assert_eq!(
            to_text(&value).expect("serializable"),
            r#"{"kept":true,"list":[null,1]}"#
        );
    }

    #[test]
    fn non_finite_numbers_become_null() {
        let value = Value::sequence(vec![
            Value::from(f64::NAN),
            Value::from(f64::INFINITY),
            Value::from(1.5),
        ]);
        assert_eq!(to_text(&value).expect("serializable"), "[null,null,1.5]");
    }

    #[test]
    fn unconverted_structured_kinds_fail() {
        let err = to_json_value(&Value::BigInt("1".into())).expect_err("bigint needs a transformer");
        assert!(matches!(err, Error::Unserializable { kind: ValueKind::BigInt }));

        let nested = Value::object(vec![("m", Value::map(vec![("x", Value::from(1))]))]);
        let err = to_json_value(&nested).expect_err("map needs a transformer");
        assert!(matches!(err, Error::Unserializable { kind: ValueKind::Map }));
    }
}
