//! The dynamic value graph redaction operates on.
//!
//! This module provides:
//!
//! - [`Value`]: scalars, containers, and structured kinds (dates, errors,
//!   regexes, URLs, maps, sets) in one dynamic type
//! - [`Segment`] / [`display_path`]: locations inside a value graph
//! - [`ValueKind`]: the classification used by allowed-kinds filtering
//!
//! Containers are reference-counted so a graph may legitimately contain
//! cycles; cycle handling lives in `redaction::cycle`, not here. Mapping
//! entries are kept as insertion-ordered vectors because output ordering must
//! equal input ordering.

use std::{cell::RefCell, fmt, rc::Rc};

use chrono::{DateTime, Utc};
use url::Url;

/// Insertion-ordered mapping entries.
pub type Entries = Vec<(String, Value)>;

// =============================================================================
// Structured-kind payloads
// =============================================================================

/// Payload of an error-like value.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorValue {
    /// Concrete error kind name (e.g. `"TypeError"`, `"io::Error"`).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Captured backtrace text, if any.
    pub stack: Option<String>,
}

/// Payload of a regex-like value. The pattern is carried as text, not
/// compiled; it is data to be redacted, not a matcher.
#[derive(Clone, Debug, PartialEq)]
pub struct RegexValue {
    pub source: String,
    pub flags: String,
}

/// Marker payload emitted by the cycle normalizer when a container is found
/// to be its own ancestor.
#[derive(Clone, Debug, PartialEq)]
pub struct CircularRef {
    /// Path of the first occurrence of the container.
    pub original_path: String,
    /// Path at which the repeat occurrence was found.
    pub current_path: String,
}

// =============================================================================
// Value
// =============================================================================

/// A dynamic value: scalar, container, or structured kind.
///
/// Containers (`Sequence`, `Object`, `Map`, `Set`) are `Rc`-shared, so the
/// same container may appear under several parents and a graph may be cyclic.
/// Equality and `Debug` recurse through containers and are only meaningful on
/// acyclic graphs.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    /// Absent value. Dropped from mappings on serialization, `null` in
    /// sequences.
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Arbitrary-precision integer, carried as its base-10 digits.
    BigInt(String),
    String(String),
    /// Opaque callable; only its display name is retained.
    Callable(String),
    /// Ordered sequence of values.
    Sequence(Rc<RefCell<Vec<Value>>>),
    /// Keyed mapping with insertion-order-significant entries.
    Object(Rc<RefCell<Entries>>),
    Date(DateTime<Utc>),
    Error(Box<ErrorValue>),
    Regex(Box<RegexValue>),
    Url(Box<Url>),
    /// Map-like container: ordered key/value entries, distinct from a plain
    /// mapping until a transformer converts it.
    Map(Rc<RefCell<Entries>>),
    /// Set-like container: ordered members.
    Set(Rc<RefCell<Vec<Value>>>),
    /// Cycle marker; produced only by the cycle normalizer.
    Circular(Box<CircularRef>),
}

/// Classification of a value, used by the allowed-kinds filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Undefined,
    Boolean,
    Number,
    BigInt,
    String,
    Callable,
    Sequence,
    Mapping,
    Date,
    Error,
    Regex,
    Url,
    Map,
    Set,
    Circular,
}

impl Value {
    /// Builds a mapping from key/value pairs, preserving iteration order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Builds an ordered sequence.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::Sequence(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Builds a map-like container from ordered entries.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Builds a set-like container from ordered members.
    pub fn set<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::Set(Rc::new(RefCell::new(members.into_iter().collect())))
    }

    /// Builds an error-like value.
    pub fn error<K, M>(kind: K, message: M, stack: Option<String>) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        Self::Error(Box::new(ErrorValue {
            kind: kind.into(),
            message: message.into(),
            stack,
        }))
    }

    /// Builds a regex-like value from pattern text and flags.
    pub fn regex<S, F>(source: S, flags: F) -> Self
    where
        S: Into<String>,
        F: Into<String>,
    {
        Self::Regex(Box::new(RegexValue {
            source: source.into(),
            flags: flags.into(),
        }))
    }

    /// Returns the classification of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Undefined => ValueKind::Undefined,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Int(_) | Self::Float(_) => ValueKind::Number,
            Self::BigInt(_) => ValueKind::BigInt,
            Self::String(_) => ValueKind::String,
            Self::Callable(_) => ValueKind::Callable,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Object(_) => ValueKind::Mapping,
            Self::Date(_) => ValueKind::Date,
            Self::Error(_) => ValueKind::Error,
            Self::Regex(_) => ValueKind::Regex,
            Self::Url(_) => ValueKind::Url,
            Self::Map(_) => ValueKind::Map,
            Self::Set(_) => ValueKind::Set,
            Self::Circular(_) => ValueKind::Circular,
        }
    }

    /// Whether this value is a traversable container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Sequence(_) | Self::Object(_) | Self::Map(_) | Self::Set(_)
        )
    }

    /// Identity of the underlying shared container allocation, if any.
    ///
    /// Two values reference the same container exactly when their identities
    /// are equal; this drives cycle detection.
    #[must_use]
    pub fn container_id(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) | Self::Set(items) => Some(Rc::as_ptr(items) as usize),
            Self::Object(entries) | Self::Map(entries) => Some(Rc::as_ptr(entries) as usize),
            _ => None,
        }
    }

    /// Looks up a mapping entry by key. Returns `None` for non-mappings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Object(entries) | Self::Map(entries) => entries
                .borrow()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Looks up a sequence element by index. Returns `None` for non-sequences.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Self::Sequence(items) | Self::Set(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Number of children for containers, `None` otherwise.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) | Self::Set(items) => Some(items.borrow().len()),
            Self::Object(entries) | Self::Map(entries) => Some(entries.borrow().len()),
            _ => None,
        }
    }

    /// Borrows the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Url> for Value {
    fn from(value: Url) -> Self {
        Self::Url(Box::new(value))
    }
}

// =============================================================================
// Paths
// =============================================================================

/// One element of a path: a mapping key or a sequence index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// The segment as comparison text (indices use their decimal form).
    #[must_use]
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Key(key) => std::borrow::Cow::Borrowed(key),
            Self::Index(index) => std::borrow::Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<usize> for Segment {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Renders a path in dotted form (`a.b.0.c`).
#[must_use]
pub fn display_path(path: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match segment {
            Segment::Key(key) => out.push_str(key),
            Segment::Index(index) => {
                out.push_str(&index.to_string());
            }
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_preserves_insertion_order() {
        let value = Value::object(vec![
            ("z", Value::from(1)),
            ("a", Value::from(2)),
            ("m", Value::from(3)),
        ]);
        let Value::Object(entries) = &value else {
            panic!("expected an object");
        };
        let keys: Vec<String> = entries.borrow().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn container_identity_tracks_sharing() {
        let shared = Value::sequence(vec![Value::from(1)]);
        let other = Value::sequence(vec![Value::from(1)]);
        assert_eq!(shared.container_id(), shared.clone().container_id());
        assert_ne!(shared.container_id(), other.container_id());
        assert_eq!(Value::from("x").container_id(), None);
    }

    #[test]
    fn kind_classifies_every_variant() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Number);
        assert_eq!(Value::BigInt("9".into()).kind(), ValueKind::BigInt);
        assert_eq!(Value::map(Vec::<(String, Value)>::new()).kind(), ValueKind::Map);
        assert_eq!(Value::set(vec![]).kind(), ValueKind::Set);
        assert_eq!(Value::regex("a+", "i").kind(), ValueKind::Regex);
    }

    #[test]
    fn display_path_joins_segments_with_dots() {
        let path = vec![
            Segment::from("user"),
            Segment::from("emails"),
            Segment::from(0_usize),
            Segment::from("address"),
        ];
        assert_eq!(display_path(&path), "user.emails.0.address");
        assert_eq!(display_path(&[]), "");
    }

    #[test]
    fn lookup_helpers_walk_containers() {
        let value = Value::object(vec![(
            "items",
            Value::sequence(vec![Value::from("a"), Value::from("b")]),
        )]);
        let items = value.get("items").expect("items present");
        assert_eq!(items.at(1), Some(Value::from("b")));
        assert_eq!(items.len(), Some(2));
        assert_eq!(value.get("missing"), None);
    }
}
