//! Value classification and the kind-transformer registry.
//!
//! This module provides:
//!
//! - [`classify`]: one classification function producing a primitive type tag
//!   and, where applicable, a structured kind, consumed everywhere a value's
//!   nature matters, instead of scattered variant checks
//! - [`TransformerRegistry`]: maps classifications to ordered conversion
//!   functions that make otherwise-unrepresentable values redaction- and
//!   serialization-safe
//!
//! Candidate transformers for a value are tried in order: type-tag
//! transformers, then structured-kind transformers, then unconditional
//! fallbacks. The first one returning a replacement wins; otherwise the value
//! passes through unchanged. Strings bypass the registry entirely; string
//! redaction belongs to the string-content pipeline.

use std::{collections::HashMap, sync::Arc};

use chrono::SecondsFormat;

use crate::value::{Segment, Value};

// =============================================================================
// Classification
// =============================================================================

/// Primitive type tag of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Undefined,
    Boolean,
    Number,
    BigInt,
    String,
    Callable,
    /// Containers and structured kinds.
    Object,
}

/// Structured classification beyond the primitive type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuredKind {
    Date,
    Error,
    Map,
    Set,
    Regex,
    Url,
    Circular,
}

/// Classifies a value into its type tag and optional structured kind.
#[must_use]
pub fn classify(value: &Value) -> (TypeTag, Option<StructuredKind>) {
    match value {
        Value::Null => (TypeTag::Null, None),
        Value::Undefined => (TypeTag::Undefined, None),
        Value::Bool(_) => (TypeTag::Boolean, None),
        Value::Int(_) | Value::Float(_) => (TypeTag::Number, None),
        Value::BigInt(_) => (TypeTag::BigInt, None),
        Value::String(_) => (TypeTag::String, None),
        Value::Callable(_) => (TypeTag::Callable, None),
        Value::Sequence(_) | Value::Object(_) => (TypeTag::Object, None),
        Value::Date(_) => (TypeTag::Object, Some(StructuredKind::Date)),
        Value::Error(_) => (TypeTag::Object, Some(StructuredKind::Error)),
        Value::Regex(_) => (TypeTag::Object, Some(StructuredKind::Regex)),
        Value::Url(_) => (TypeTag::Object, Some(StructuredKind::Url)),
        Value::Map(_) => (TypeTag::Object, Some(StructuredKind::Map)),
        Value::Set(_) => (TypeTag::Object, Some(StructuredKind::Set)),
        Value::Circular(_) => (TypeTag::Object, Some(StructuredKind::Circular)),
    }
}

// =============================================================================
// TransformerRegistry
// =============================================================================

/// A conversion function. Returns `None` to pass the value through to the
/// next candidate. The key under which the value sits is provided when known.
pub type Transformer = Arc<dyn Fn(&Value, Option<&Segment>) -> Option<Value> + Send + Sync>;

/// Dispatch table from value classification to conversion functions.
///
/// Built once at `Redactor` construction and reused immutably across calls.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    by_type: HashMap<TypeTag, Vec<Transformer>>,
    by_kind: HashMap<StructuredKind, Vec<Transformer>>,
    fallback: Vec<Transformer>,
}

impl TransformerRegistry {
    /// An empty registry: every value passes through unchanged.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry loaded with the built-in kind conversions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_for_type(TypeTag::BigInt, Arc::new(builtin::bigint));
        registry.register_for_kind(StructuredKind::Date, Arc::new(builtin::date));
        registry.register_for_kind(StructuredKind::Error, Arc::new(builtin::error));
        registry.register_for_kind(StructuredKind::Map, Arc::new(builtin::map));
        registry.register_for_kind(StructuredKind::Set, Arc::new(builtin::set));
        registry.register_for_kind(StructuredKind::Regex, Arc::new(builtin::regex));
        registry.register_for_kind(StructuredKind::Url, Arc::new(builtin::url));
        registry.register_for_kind(StructuredKind::Circular, Arc::new(builtin::circular));
        registry
    }

    /// A legacy-compatible registry: a flat ordered list of unconditional
    /// fallback transformers, tried against every non-string value.
    #[must_use]
    pub fn from_fallbacks<I>(transformers: I) -> Self
    where
        I: IntoIterator<Item = Transformer>,
    {
        let mut registry = Self::empty();
        registry.fallback = transformers.into_iter().collect();
        registry
    }

    /// Appends a transformer for a primitive type tag.
    pub fn register_for_type(&mut self, tag: TypeTag, transformer: Transformer) {
        self.by_type.entry(tag).or_default().push(transformer);
    }

    /// Appends a transformer for a structured kind.
    pub fn register_for_kind(&mut self, kind: StructuredKind, transformer: Transformer) {
        self.by_kind.entry(kind).or_default().push(transformer);
    }

    /// Appends an unconditional fallback transformer.
    pub fn register_fallback(&mut self, transformer: Transformer) {
        self.fallback.push(transformer);
    }

    /// Applies the first matching transformer, or `None` if the value passes
    /// through unchanged. Strings always pass through.
    #[must_use]
    pub fn apply(&self, value: &Value, key: Option<&Segment>) -> Option<Value> {
        let (tag, structured) = classify(value);
        if tag == TypeTag::String {
            return None;
        }

        let by_type = self.by_type.get(&tag).map(Vec::as_slice).unwrap_or(&[]);
        let by_kind = structured
            .and_then(|kind| self.by_kind.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        by_type
            .iter()
            .chain(by_kind)
            .chain(&self.fallback)
            .find_map(|transformer| transformer(value, key))
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("by_type", &self.by_type.keys().collect::<Vec<_>>())
            .field("by_kind", &self.by_kind.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.len())
            .finish()
    }
}

// =============================================================================
// Built-in conversions
// =============================================================================

mod builtin {
    use super::{SecondsFormat, Segment, Value};

    pub(super) fn bigint(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::BigInt(digits) = value else {
            return None;
        };
        Some(Value::object(vec![
            (
                "value",
                Value::object(vec![
                    ("radix", Value::Int(10)),
                    ("number", Value::String(digits.clone())),
                ]),
            ),
            ("marker", Value::from("bigint")),
        ]))
    }

    pub(super) fn date(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Date(datetime) = value else {
            return None;
        };
        Some(Value::object(vec![
            (
                "datetime",
                Value::String(datetime.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            ("marker", Value::from("date")),
        ]))
    }

    pub(super) fn error(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Error(err) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("marker", Value::from("error")),
            (
                "value",
                Value::object(vec![
                    ("type", Value::String(err.kind.clone())),
                    ("message", Value::String(err.message.clone())),
                    (
                        "stack",
                        err.stack.clone().map_or(Value::Null, Value::String),
                    ),
                ]),
            ),
        ]))
    }

    pub(super) fn map(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Map(entries) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("value", Value::object(entries.borrow().clone())),
            ("marker", Value::from("map")),
        ]))
    }

    pub(super) fn set(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Set(members) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("value", Value::sequence(members.borrow().clone())),
            ("marker", Value::from("set")),
        ]))
    }

    pub(super) fn regex(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Regex(re) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("marker", Value::from("regex")),
            (
                "value",
                Value::object(vec![
                    ("source", Value::String(re.source.clone())),
                    ("flags", Value::String(re.flags.clone())),
                ]),
            ),
        ]))
    }

    pub(super) fn url(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Url(url) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("value", Value::String(url.to_string())),
            ("marker", Value::from("url")),
        ]))
    }

    pub(super) fn circular(value: &Value, _key: Option<&Segment>) -> Option<Value> {
        let Value::Circular(marker) = value else {
            return None;
        };
        Some(Value::object(vec![
            ("kind", Value::from("circular")),
            ("originalPath", Value::String(marker.original_path.clone())),
            ("currentPath", Value::String(marker.current_path.clone())),
        ]))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn registry() -> TransformerRegistry {
        TransformerRegistry::with_builtins()
    }

    #[test]
    fn classify_separates_tags_and_kinds() {
        assert_eq!(classify(&Value::from(1)), (TypeTag::Number, None));
        assert_eq!(classify(&Value::BigInt("1".into())), (TypeTag::BigInt, None));
        assert_eq!(
            classify(&Value::map(Vec::<(String, Value)>::new())),
            (TypeTag::Object, Some(StructuredKind::Map))
        );
        assert_eq!(
            classify(&Value::sequence(vec![])),
            (TypeTag::Object, None)
        );
    }

    #[test]
    fn bigint_converts_to_radix_marker() {
        let converted = registry()
            .apply(&Value::BigInt("12345678901234567890".into()), None)
            .expect("bigint is converted");
        assert_eq!(
            converted,
            Value::object(vec![
                (
                    "value",
                    Value::object(vec![
                        ("radix", Value::Int(10)),
                        ("number", Value::from("12345678901234567890")),
                    ]),
                ),
                ("marker", Value::from("bigint")),
            ])
        );
    }

    #[test]
    fn date_converts_to_iso_marker() {
        let datetime = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let converted = registry()
            .apply(&Value::Date(datetime), None)
            .expect("date is converted");
        assert_eq!(
            converted.get("datetime"),
            Some(Value::from("2023-01-02T03:04:05.000Z"))
        );
        assert_eq!(converted.get("marker"), Some(Value::from("date")));
    }

    #[test]
    fn error_converts_to_typed_marker() {
        let converted = registry()
            .apply(
                &Value::error("TypeError", "boom", Some("at main".to_string())),
                None,
            )
            .expect("error is converted");
        assert_eq!(converted.get("marker"), Some(Value::from("error")));
        let payload = converted.get("value").expect("payload present");
        assert_eq!(payload.get("type"), Some(Value::from("TypeError")));
        assert_eq!(payload.get("message"), Some(Value::from("boom")));
        assert_eq!(payload.get("stack"), Some(Value::from("at main")));
    }

    #[test]
    fn map_and_set_convert_to_plain_containers() {
        let converted = registry()
            .apply(&Value::map(vec![("x", Value::from(1))]), None)
            .expect("map is converted");
        assert_eq!(
            converted,
            Value::object(vec![
                ("value", Value::object(vec![("x", Value::from(1))])),
                ("marker", Value::from("map")),
            ])
        );

        let converted = registry()
            .apply(&Value::set(vec![Value::from("a"), Value::from("b")]), None)
            .expect("set is converted");
        assert_eq!(
            converted,
            Value::object(vec![
                (
                    "value",
                    Value::sequence(vec![Value::from("a"), Value::from("b")]),
                ),
                ("marker", Value::from("set")),
            ])
        );
    }

    #[test]
    fn regex_and_url_convert_to_markers() {
        let converted = registry()
            .apply(&Value::regex("a+b", "gi"), None)
            .expect("regex is converted");
        assert_eq!(converted.get("marker"), Some(Value::from("regex")));
        assert_eq!(
            converted.get("value").and_then(|v| v.get("source")),
            Some(Value::from("a+b"))
        );

        let url = url::Url::parse("https://example.com/a?b=1").expect("valid url");
        let converted = registry()
            .apply(&Value::from(url), None)
            .expect("url is converted");
        assert_eq!(
            converted,
            Value::object(vec![
                ("value", Value::from("https://example.com/a?b=1")),
                ("marker", Value::from("url")),
            ])
        );
    }

    #[test]
    fn strings_bypass_the_registry() {
        let mut registry = TransformerRegistry::empty();
        registry.register_fallback(Arc::new(|_, _| Some(Value::from("transformed"))));
        assert_eq!(registry.apply(&Value::from("secret"), None), None);
        // Non-strings do reach the fallback.
        assert_eq!(
            registry.apply(&Value::from(1), None),
            Some(Value::from("transformed"))
        );
    }

    #[test]
    fn first_returning_transformer_wins() {
        let mut registry = TransformerRegistry::empty();
        registry.register_for_type(TypeTag::Number, Arc::new(|_, _| None));
        registry.register_for_type(TypeTag::Number, Arc::new(|_, _| Some(Value::from("second"))));
        registry.register_fallback(Arc::new(|_, _| Some(Value::from("fallback"))));
        assert_eq!(
            registry.apply(&Value::from(7), None),
            Some(Value::from("second"))
        );
    }

    #[test]
    fn unregistered_kinds_pass_through() {
        let registry = TransformerRegistry::empty();
        assert_eq!(registry.apply(&Value::BigInt("1".into()), None), None);
        assert_eq!(registry.apply(&Value::Null, None), None);
    }
}
