//! The traversal engine: [`Redactor`], its builder, and the per-frame
//! redaction loop.
//!
//! The engine consumes the cycle-free graph produced by
//! [`cycle::normalize`], an explicit work stack, the
//! [`TransformerRegistry`], and the path matcher, and produces the output
//! graph while resolving redaction policy per node. The main traversal is
//! iterative so native call depth stays bounded on deep graphs.
//!
//! Redaction precedence, applied identically wherever a value is redacted:
//! retain-structure (keep shape, replace leaves), then remove (omit the
//! slot; sequences shift, never leave holes), then computed replacement,
//! then length-preserving string replacement, then literal replacement text.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use tracing::trace;

use crate::{
    error::Error,
    policy::{
        PatternPolicy, PolicyDefaults, Replacement, ResolvedPolicy, StringTest,
        text::repeat_by_length,
    },
    redaction::{
        cycle,
        json,
        matcher::{self, SegmentMatcher},
        transform::{Transformer, TransformerRegistry},
    },
    value::{Entries, Segment, Value},
};

// =============================================================================
// PathPattern
// =============================================================================

/// A configured path pattern: segment matchers plus an optional override
/// record. Patterns apply in declaration order; the first match wins.
#[derive(Clone, Debug, Default)]
pub struct PathPattern {
    segments: Vec<SegmentMatcher>,
    policy: PatternPolicy,
}

impl PathPattern {
    /// A pattern with default overrides.
    #[must_use]
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = SegmentMatcher>,
    {
        Self {
            segments: segments.into_iter().collect(),
            policy: PatternPolicy::default(),
        }
    }

    /// Parses a pattern from plain text segments (`*` and `**` spellings are
    /// recognized; everything else is a literal).
    #[must_use]
    pub fn parse<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::new(segments.into_iter().map(SegmentMatcher::from))
    }

    /// Attaches an override record.
    #[must_use]
    pub fn with_policy(mut self, policy: PatternPolicy) -> Self {
        self.policy = policy;
        self
    }
}

struct CompiledPattern {
    segments: Vec<SegmentMatcher>,
    policy: Arc<ResolvedPolicy>,
}

// =============================================================================
// Redacted output
// =============================================================================

/// Result of a `redact` call: a structural value, or serialized text when
/// the redactor was built with `serialise(true)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Redacted {
    Value(Value),
    Text(String),
}

impl Redacted {
    /// The structural value, if this is not serialized output.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The serialized text, if the redactor serialized.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

// =============================================================================
// RedactorBuilder
// =============================================================================

/// Merges user configuration with defaults and builds an immutable
/// [`Redactor`].
#[derive(Debug, Default)]
pub struct RedactorBuilder {
    patterns: Vec<PathPattern>,
    string_tests: Vec<StringTest>,
    defaults: PolicyDefaults,
    registry: Option<TransformerRegistry>,
    serialise: bool,
}

impl RedactorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a path pattern. Order is significant: the first configured
    /// pattern matching a path wins.
    #[must_use]
    pub fn pattern(mut self, pattern: PathPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Appends a string-content test. Order is significant.
    #[must_use]
    pub fn string_test(mut self, test: StringTest) -> Self {
        self.string_tests.push(test);
        self
    }

    /// Sets the global defaults for all override fields.
    #[must_use]
    pub fn defaults(mut self, defaults: PolicyDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Uses a structured transformer registry instead of the built-ins.
    #[must_use]
    pub fn registry(mut self, registry: TransformerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses a flat ordered fallback list of transformers (legacy-compatible
    /// registration).
    #[must_use]
    pub fn transformers<I>(mut self, transformers: I) -> Self
    where
        I: IntoIterator<Item = Transformer>,
    {
        self.registry = Some(TransformerRegistry::from_fallbacks(transformers));
        self
    }

    /// Return serialized text from `redact` instead of a structural value.
    #[must_use]
    pub fn serialise(mut self, serialise: bool) -> Self {
        self.serialise = serialise;
        self
    }

    /// Alternate spelling of [`RedactorBuilder::serialise`].
    #[must_use]
    pub fn serialize(self, serialize: bool) -> Self {
        self.serialise(serialize)
    }

    /// Compiles patterns and resolves overrides into an immutable redactor.
    #[must_use]
    pub fn build(self) -> Redactor {
        let defaults = self.defaults.resolved();
        let patterns = self
            .patterns
            .into_iter()
            .map(|pattern| CompiledPattern {
                segments: pattern.segments,
                policy: Arc::new(pattern.policy.resolve(&self.defaults)),
            })
            .collect();
        Redactor {
            patterns,
            string_tests: self.string_tests,
            defaults: Arc::new(defaults),
            registry: self.registry.unwrap_or_else(TransformerRegistry::with_builtins),
            serialise: self.serialise,
        }
    }
}

// =============================================================================
// Redactor
// =============================================================================

/// The redaction engine. Immutable after construction: compiled patterns,
/// string tests, resolved defaults, and the transformer registry are built
/// once and reused across every `redact` call. Each call allocates its own
/// work stack and traversal state, so a long-lived instance accumulates
/// nothing between calls.
///
/// # Example
///
/// ```
/// use deepscrub::{PathPattern, Redactor, Value};
///
/// let redactor = Redactor::builder()
///     .pattern(PathPattern::parse(["password"]))
///     .build();
///
/// let input = Value::object(vec![
///     ("password", Value::from("secret")),
///     ("user", Value::from("bob")),
/// ]);
/// let output = redactor.redact_value(&input);
/// assert_eq!(output.get("password"), Some(Value::from("[REDACTED]")));
/// assert_eq!(output.get("user"), Some(Value::from("bob")));
/// ```
#[derive(Debug)]
pub struct Redactor {
    patterns: Vec<CompiledPattern>,
    string_tests: Vec<StringTest>,
    defaults: Arc<ResolvedPolicy>,
    registry: TransformerRegistry,
    serialise: bool,
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("segments", &self.segments)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Where a resolved child value is written.
enum ParentSlot {
    Sequence(Rc<RefCell<Vec<Value>>>),
    Mapping(Rc<RefCell<Entries>>),
}

/// One unit of traversal work.
struct Frame {
    parent: ParentSlot,
    key: Segment,
    value: Value,
    path: Vec<Segment>,
    /// True once any ancestor was flagged for redaction with
    /// retain-structure in effect.
    redacting: bool,
    /// Policy governing this frame: the pattern its own path matched, or the
    /// policy inherited from the ancestor that started redacting.
    policy: Option<Arc<ResolvedPolicy>>,
    /// Whether this frame's own path matched a pattern (as opposed to only
    /// inheriting a policy).
    matched: bool,
}

/// Outcome of redacting a single slot.
enum Resolved {
    /// Omit the slot entirely; sequence indices shift down.
    Omit,
    Value(Value),
}

impl Redactor {
    /// Starts building a redactor.
    #[must_use]
    pub fn builder() -> RedactorBuilder {
        RedactorBuilder::new()
    }

    /// Redacts `value`, honoring the construction-time `serialise` flag.
    ///
    /// Serialization fails when a value kind reaches the serializer without
    /// a registered transformer; that error is surfaced as-is.
    pub fn redact(&self, value: &Value) -> Result<Redacted, Error> {
        let output = self.traverse(value);
        if self.serialise {
            Ok(Redacted::Text(json::to_text(&output)?))
        } else {
            Ok(Redacted::Value(output))
        }
    }

    /// Redacts `value`, always returning the structural result.
    #[must_use]
    pub fn redact_value(&self, value: &Value) -> Value {
        self.traverse(value)
    }

    // -------------------------------------------------------------------------
    // Entry dispatch
    // -------------------------------------------------------------------------

    fn traverse(&self, root: &Value) -> Value {
        // A string root goes straight through the string-content pipeline.
        if let Value::String(text) = root {
            return match self.apply_string_tests(text) {
                // There is no slot to omit at the root.
                Some(Resolved::Omit) => Value::Undefined,
                Some(Resolved::Value(value)) => value,
                None => root.clone(),
            };
        }

        // Kind conversion applies to the root as well (e.g. a root-level
        // native map becomes its marker mapping before key-based redaction).
        let current = self
            .registry
            .apply(root, None)
            .unwrap_or_else(|| root.clone());

        if !matches!(current, Value::Sequence(_) | Value::Object(_)) {
            return current;
        }

        let current = cycle::normalize(&current);
        self.traverse_container(&current)
    }

    fn traverse_container(&self, root: &Value) -> Value {
        let mut stack: Vec<Frame> = Vec::new();

        let output = match root {
            Value::Sequence(items) => {
                let out = Rc::new(RefCell::new(Vec::new()));
                self.push_children_seq(&mut stack, &items.borrow(), &out, &[], false, None);
                Value::Sequence(out)
            }
            Value::Object(entries) => {
                let out = Rc::new(RefCell::new(Entries::new()));
                self.push_children_map(&mut stack, &entries.borrow(), &out, &[], false, None);
                Value::Object(out)
            }
            _ => unreachable!("traverse_container is only called with plain containers"),
        };

        while let Some(frame) = stack.pop() {
            self.process_frame(&mut stack, frame);
        }

        output
    }

    // -------------------------------------------------------------------------
    // Per-frame loop
    // -------------------------------------------------------------------------

    fn process_frame(&self, stack: &mut Vec<Frame>, frame: Frame) {
        // Cycle markers are terminal: their conversion is written as-is and
        // the payload is never redacted or descended into.
        if matches!(frame.value, Value::Circular(_)) {
            let converted = self
                .registry
                .apply(&frame.value, Some(&frame.key))
                .unwrap_or_else(|| frame.value.clone());
            Self::write(&frame.parent, &frame.key, converted);
            return;
        }

        let transformed = self
            .registry
            .apply(&frame.value, Some(&frame.key))
            .unwrap_or_else(|| frame.value.clone());

        if matches!(transformed, Value::Sequence(_) | Value::Object(_)) {
            self.process_container(stack, &frame, transformed);
        } else {
            match self.resolve_primitive(&frame, &transformed) {
                Resolved::Omit => {}
                Resolved::Value(value) => Self::write(&frame.parent, &frame.key, value),
            }
        }
    }

    /// Primitive policy: inherited redaction first, then a direct pattern
    /// match, then string-content tests, then pass-through.
    fn resolve_primitive(&self, frame: &Frame, value: &Value) -> Resolved {
        let policy = frame.policy.as_deref().unwrap_or(&*self.defaults);

        if frame.redacting {
            if policy.allows_kind(value.kind()) {
                return Self::redact_slot(value, policy);
            }
            return Resolved::Value(value.clone());
        }

        if frame.matched {
            return Self::redact_slot(value, policy);
        }

        if let Value::String(text) = value {
            if let Some(resolved) = self.apply_string_tests(text) {
                return resolved;
            }
        }

        Resolved::Value(value.clone())
    }

    fn process_container(&self, stack: &mut Vec<Frame>, frame: &Frame, container: Value) {
        let should_redact = frame.redacting || frame.matched;
        let policy = frame.policy.as_deref().unwrap_or(&*self.defaults);

        if should_redact && !policy.retain_structure {
            // Collapse immediately; the subtree is never descended into.
            match Self::redact_slot(&container, policy) {
                Resolved::Omit => {}
                Resolved::Value(value) => Self::write(&frame.parent, &frame.key, value),
            }
            return;
        }

        // Allocate the output container and place it in the parent slot now;
        // children fill it as they resolve. Traversal is strictly sequential,
        // so the slot is complete before the call returns.
        let child_policy = frame.policy.clone();
        match container {
            Value::Sequence(items) => {
                let out = Rc::new(RefCell::new(Vec::new()));
                Self::write(&frame.parent, &frame.key, Value::Sequence(Rc::clone(&out)));
                self.push_children_seq(
                    stack,
                    &items.borrow(),
                    &out,
                    &frame.path,
                    should_redact,
                    child_policy,
                );
            }
            Value::Object(entries) => {
                let out = Rc::new(RefCell::new(Entries::new()));
                Self::write(&frame.parent, &frame.key, Value::Object(Rc::clone(&out)));
                self.push_children_map(
                    stack,
                    &entries.borrow(),
                    &out,
                    &frame.path,
                    should_redact,
                    child_policy,
                );
            }
            _ => unreachable!("process_container is only called with plain containers"),
        }
    }

    // -------------------------------------------------------------------------
    // Frame construction
    // -------------------------------------------------------------------------

    /// Children are pushed in reverse so popping restores original order;
    /// output key and index order always equals input order.
    fn push_children_seq(
        &self,
        stack: &mut Vec<Frame>,
        items: &[Value],
        out: &Rc<RefCell<Vec<Value>>>,
        path: &[Segment],
        redacting: bool,
        inherited: Option<Arc<ResolvedPolicy>>,
    ) {
        for (index, item) in items.iter().enumerate().rev() {
            let key = Segment::Index(index);
            stack.push(self.frame(
                ParentSlot::Sequence(Rc::clone(out)),
                key,
                item.clone(),
                path,
                redacting,
                inherited.clone(),
            ));
        }
    }

    fn push_children_map(
        &self,
        stack: &mut Vec<Frame>,
        entries: &[(String, Value)],
        out: &Rc<RefCell<Entries>>,
        path: &[Segment],
        redacting: bool,
        inherited: Option<Arc<ResolvedPolicy>>,
    ) {
        for (key, item) in entries.iter().rev() {
            stack.push(self.frame(
                ParentSlot::Mapping(Rc::clone(out)),
                Segment::Key(key.clone()),
                item.clone(),
                path,
                redacting,
                inherited.clone(),
            ));
        }
    }

    fn frame(
        &self,
        parent: ParentSlot,
        key: Segment,
        value: Value,
        parent_path: &[Segment],
        redacting: bool,
        inherited: Option<Arc<ResolvedPolicy>>,
    ) -> Frame {
        let mut path = parent_path.to_vec();
        path.push(key.clone());

        let matched_policy = self.resolve_pattern(&path);
        let matched = matched_policy.is_some();
        // A direct match takes precedence over an inherited policy.
        let policy = matched_policy.or(inherited);

        Frame {
            parent,
            key,
            value,
            path,
            redacting,
            policy,
            matched,
        }
    }

    /// First configured pattern (declaration order) matching `path` wins.
    fn resolve_pattern(&self, path: &[Segment]) -> Option<Arc<ResolvedPolicy>> {
        self.patterns.iter().enumerate().find_map(|(index, pattern)| {
            if matcher::matches(
                path,
                &pattern.segments,
                pattern.policy.fuzzy,
                pattern.policy.case_sensitive,
            ) {
                trace!(path = %crate::value::display_path(path), pattern = index, "path matched");
                Some(Arc::clone(&pattern.policy))
            } else {
                None
            }
        })
    }

    // -------------------------------------------------------------------------
    // Redaction primitives
    // -------------------------------------------------------------------------

    /// Applies the remove / compute / by-length / literal precedence to one
    /// slot. Retain-structure is handled by the container branch before this
    /// point.
    fn redact_slot(value: &Value, policy: &ResolvedPolicy) -> Resolved {
        if policy.remove {
            return Resolved::Omit;
        }
        match &policy.replacement {
            Replacement::Compute(compute) => Resolved::Value(compute(value)),
            Replacement::Text(text) => {
                if policy.replace_by_length {
                    if let Value::String(original) = value {
                        return Resolved::Value(Value::String(repeat_by_length(
                            text,
                            original.chars().count(),
                        )));
                    }
                }
                Resolved::Value(Value::String(text.clone().into_owned()))
            }
        }
    }

    /// Runs the ordered string-content tests; the first match wins. Returns
    /// `None` when no test matches.
    fn apply_string_tests(&self, text: &str) -> Option<Resolved> {
        let test = self.string_tests.iter().find(|test| test.matches(text))?;
        match test.rewritten(text) {
            Some(rewritten) => Some(Resolved::Value(Value::String(rewritten))),
            None => Some(Self::redact_slot(
                &Value::String(text.to_string()),
                &self.defaults,
            )),
        }
    }

    fn write(parent: &ParentSlot, key: &Segment, value: Value) {
        match parent {
            ParentSlot::Sequence(items) => items.borrow_mut().push(value),
            ParentSlot::Mapping(entries) => {
                let key = match key {
                    Segment::Key(key) => key.clone(),
                    Segment::Index(index) => index.to_string(),
                };
                entries.borrow_mut().push((key, value));
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
