//! Redaction policy records: global defaults, per-pattern overrides, and
//! their resolution.
//!
//! This module provides:
//!
//! - [`Replacement`]: what a redacted value becomes (literal text or a
//!   computed value), a tagged variant resolved at one dispatch point
//! - [`PatternPolicy`]: the partial override record attached to a path
//!   pattern; unset fields fall back to the global defaults
//! - [`PolicyDefaults`]: the global defaults for every override field
//! - [`ResolvedPolicy`]: a fully-resolved record, computed once per pattern
//!   at construction time

use std::{borrow::Cow, sync::Arc};

use crate::{
    policy::text::REDACTED_PLACEHOLDER,
    value::{Value, ValueKind},
};

// =============================================================================
// Replacement
// =============================================================================

/// What a redacted value is replaced with.
#[derive(Clone)]
pub enum Replacement {
    /// Fixed replacement text.
    Text(Cow<'static, str>),
    /// Computed replacement: invoked with the original value.
    Compute(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
}

impl Replacement {
    /// A literal text replacement.
    #[must_use]
    pub fn text<T>(text: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self::Text(text.into())
    }

    /// A computed replacement.
    #[must_use]
    pub fn compute<F>(compute: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Compute(Arc::new(compute))
    }
}

impl Default for Replacement {
    fn default() -> Self {
        Self::Text(Cow::Borrowed(REDACTED_PLACEHOLDER))
    }
}

impl std::fmt::Debug for Replacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

// =============================================================================
// PatternPolicy - per-pattern overrides
// =============================================================================

/// Override record attached to a path pattern.
///
/// Every field is optional; unset fields resolve against [`PolicyDefaults`]
/// when the owning [`Redactor`](crate::Redactor) is built.
#[derive(Clone, Debug, Default)]
pub struct PatternPolicy {
    /// Substring containment instead of equality for literal segments.
    pub fuzzy: Option<bool>,
    /// Exact-case comparison for literal segments.
    pub case_sensitive: Option<bool>,
    /// Omit the matched slot from the output entirely.
    pub remove: Option<bool>,
    /// What matched values become.
    pub replacement: Option<Replacement>,
    /// Tile the replacement text once per input character.
    pub replace_by_length: Option<bool>,
    /// Keep the matched container's shape and replace only leaf scalars.
    pub retain_structure: Option<bool>,
    /// Value kinds eligible for redaction under this pattern; `None` means
    /// every kind.
    pub kinds: Option<Vec<ValueKind>>,
}

impl PatternPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    #[must_use]
    pub fn remove(mut self, remove: bool) -> Self {
        self.remove = Some(remove);
        self
    }

    #[must_use]
    pub fn replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = Some(replacement);
        self
    }

    #[must_use]
    pub fn replace_by_length(mut self, replace_by_length: bool) -> Self {
        self.replace_by_length = Some(replace_by_length);
        self
    }

    #[must_use]
    pub fn retain_structure(mut self, retain_structure: bool) -> Self {
        self.retain_structure = Some(retain_structure);
        self
    }

    #[must_use]
    pub fn kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ValueKind>,
    {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Resolves this record against the global defaults.
    #[must_use]
    pub fn resolve(&self, defaults: &PolicyDefaults) -> ResolvedPolicy {
        ResolvedPolicy {
            fuzzy: self.fuzzy.unwrap_or(defaults.fuzzy),
            case_sensitive: self.case_sensitive.unwrap_or(defaults.case_sensitive),
            remove: self.remove.unwrap_or(defaults.remove),
            replacement: self
                .replacement
                .clone()
                .unwrap_or_else(|| defaults.replacement.clone()),
            replace_by_length: self.replace_by_length.unwrap_or(defaults.replace_by_length),
            retain_structure: self.retain_structure.unwrap_or(defaults.retain_structure),
            kinds: self.kinds.clone().or_else(|| defaults.kinds.clone()),
        }
    }
}

// =============================================================================
// PolicyDefaults - global defaults
// =============================================================================

/// Global defaults for every override field.
#[derive(Clone, Debug)]
pub struct PolicyDefaults {
    pub fuzzy: bool,
    pub case_sensitive: bool,
    pub remove: bool,
    pub replacement: Replacement,
    pub replace_by_length: bool,
    pub retain_structure: bool,
    pub kinds: Option<Vec<ValueKind>>,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            fuzzy: false,
            case_sensitive: true,
            remove: false,
            replacement: Replacement::default(),
            replace_by_length: false,
            retain_structure: false,
            kinds: None,
        }
    }
}

impl PolicyDefaults {
    /// The defaults as a fully-resolved record.
    #[must_use]
    pub fn resolved(&self) -> ResolvedPolicy {
        ResolvedPolicy {
            fuzzy: self.fuzzy,
            case_sensitive: self.case_sensitive,
            remove: self.remove,
            replacement: self.replacement.clone(),
            replace_by_length: self.replace_by_length,
            retain_structure: self.retain_structure,
            kinds: self.kinds.clone(),
        }
    }
}

// =============================================================================
// ResolvedPolicy
// =============================================================================

/// A fully-resolved override record. Built once per pattern at construction
/// and shared immutably across `redact` calls.
#[derive(Clone, Debug)]
pub struct ResolvedPolicy {
    pub fuzzy: bool,
    pub case_sensitive: bool,
    pub remove: bool,
    pub replacement: Replacement,
    pub replace_by_length: bool,
    pub retain_structure: bool,
    pub kinds: Option<Vec<ValueKind>>,
}

impl ResolvedPolicy {
    /// Whether `kind` is eligible for redaction under this policy.
    #[must_use]
    pub fn allows_kind(&self, kind: ValueKind) -> bool {
        self.kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }
}

// =============================================================================
// Tests
// =============================================================================
