//! Serialized-output tests: the `serialise` flag, marker shapes on the wire,
//! and serialization failure for unregistered kinds.

use chrono::{TimeZone, Utc};
use deepscrub::{
    Error, PathPattern, Redacted, Redactor, TransformerRegistry, Value, ValueKind,
};

#[test]
fn test_serialise_returns_text() {
    let redactor = Redactor::builder()
        .pattern(PathPattern::parse(["password"]))
        .serialise(true)
        .build();
    let input = Value::object(vec![
        ("password", Value::from("secret")),
        ("user", Value::from("bob")),
    ]);
    let output = redactor.redact(&input).expect("serializable");
    assert_eq!(
        output.as_text(),
        Some(r#"{"password":"[REDACTED]","user":"bob"}"#)
    );
}

#[test]
fn test_serialize_spelling_is_equivalent() {
    let redactor = Redactor::builder().serialize(true).build();
    let input = Value::object(vec![("a", Value::from(1))]);
    assert_eq!(
        redactor.redact(&input).expect("serializable"),
        Redacted::Text(r#"{"a":1}"#.to_string())
    );
}

#[test]
fn test_structural_output_by_default() {
    let redactor = Redactor::builder().build();
    let input = Value::object(vec![("a", Value::from(1))]);
    let output = redactor.redact(&input).expect("never fails structurally");
    assert_eq!(output.into_value(), Some(input));
}

#[test]
fn test_markers_serialize_with_exact_shapes() {
    let redactor = Redactor::builder().serialise(true).build();
    let datetime = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let input = Value::object(vec![
        ("when", Value::Date(datetime)),
        ("big", Value::BigInt("42".into())),
    ]);
    let output = redactor.redact(&input).expect("serializable");
    assert_eq!(
        output.as_text(),
        Some(concat!(
            r#"{"when":{"datetime":"2024-06-01T12:00:00.000Z","marker":"date"},"#,
            r#""big":{"value":{"radix":10,"number":"42"},"marker":"bigint"}}"#
        ))
    );
}

#[test]
fn test_error_kind_serializes_with_stack() {
    let redactor = Redactor::builder().serialise(true).build();
    let input = Value::object(vec![(
        "failure",
        Value::error("TimeoutError", "deadline exceeded", None),
    )]);
    let output = redactor.redact(&input).expect("serializable");
    assert_eq!(
        output.as_text(),
        Some(concat!(
            r#"{"failure":{"marker":"error","value":"#,
            r#"{"type":"TimeoutError","message":"deadline exceeded","stack":null}}}"#
        ))
    );
}

#[test]
fn test_unregistered_kind_surfaces_serialization_error() {
    // An empty registry leaves the bigint unconverted; the serializer's
    // failure propagates uncaught.
    let redactor = Redactor::builder()
        .registry(TransformerRegistry::empty())
        .serialise(true)
        .build();
    let input = Value::object(vec![("big", Value::BigInt("42".into()))]);
    let err = redactor.redact(&input).expect_err("bigint has no transformer");
    assert!(matches!(err, Error::Unserializable { kind: ValueKind::BigInt }));
}

#[test]
fn test_unregistered_kind_passes_through_structurally() {
    // Without serialization, unregistered kinds pass through unchanged.
    let redactor = Redactor::builder()
        .registry(TransformerRegistry::empty())
        .build();
    let input = Value::object(vec![("big", Value::BigInt("42".into()))]);
    assert_eq!(
        redactor.redact_value(&input).get("big"),
        Some(Value::BigInt("42".into()))
    );
}

#[test]
fn test_cycle_marker_serializes() {
    let root = Value::object(vec![("id", Value::from(7))]);
    if let Value::Object(entries) = &root {
        let self_ref = root.clone();
        entries.borrow_mut().push(("self".to_string(), self_ref));
    }
    let redactor = Redactor::builder().serialise(true).build();
    let output = redactor.redact(&root).expect("serializable");
    assert_eq!(
        output.as_text(),
        Some(concat!(
            r#"{"id":7,"self":"#,
            r#"{"kind":"circular","originalPath":"","currentPath":"self"}}"#
        ))
    );
}
