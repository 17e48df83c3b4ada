//! String-content rules and text replacement helpers.
//!
//! This module provides [`StringTest`], the ordered string-content rules the
//! engine runs against every string it encounters, independently of path and
//! key matching. A test is either a bare pattern (the whole string is
//! redacted under the active policy on match) or a pattern plus rewriter
//! (the rewriter receives the matched string and pattern and returns the
//! replacement, enabling partial in-place masking).
//!
//! Rules operate on Unicode scalar values and are pure string
//! transformations; they never traverse structures.

use std::sync::Arc;

use regex::Regex;

/// Default placeholder used for full redaction.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Default character used to mask sensitive characters.
pub const MASK_CHAR: char = '*';

/// Rewriter invoked with the matched string and its pattern.
pub type Rewriter = Arc<dyn Fn(&str, &Regex) -> String + Send + Sync>;

// =============================================================================
// StringTest
// =============================================================================

/// One string-content rule: a compiled pattern with an optional rewriter.
///
/// Tests run in declaration order; the first match wins.
#[derive(Clone)]
pub struct StringTest {
    pattern: Regex,
    rewriter: Option<Rewriter>,
}

impl StringTest {
    /// A bare pattern: on match, the whole string is redacted under the
    /// active remove/replace/length rules.
    #[must_use]
    pub fn pattern(pattern: Regex) -> Self {
        Self {
            pattern,
            rewriter: None,
        }
    }

    /// A pattern with a rewriter producing the replacement string.
    #[must_use]
    pub fn rewrite<F>(pattern: Regex, rewriter: F) -> Self
    where
        F: Fn(&str, &Regex) -> String + Send + Sync + 'static,
    {
        Self {
            pattern,
            rewriter: Some(Arc::new(rewriter)),
        }
    }

    /// Whether this test matches `value`.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }

    /// Runs the rewriter, if one is attached.
    #[must_use]
    pub fn rewritten(&self, value: &str) -> Option<String> {
        self.rewriter
            .as_ref()
            .map(|rewrite| rewrite(value, &self.pattern))
    }
}

impl std::fmt::Debug for StringTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringTest")
            .field("pattern", &self.pattern.as_str())
            .field("rewriter", &self.rewriter.is_some())
            .finish()
    }
}

// =============================================================================
// Replacement helpers
// =============================================================================

/// Tiles `token` once per input character.
///
/// This is the length-preserving replacement: the result has exactly
/// `char_count * token_chars` characters, so a one-character token preserves
/// the original length and a longer token scales it.
#[must_use]
pub fn repeat_by_length(token: &str, char_count: usize) -> String {
    token.repeat(char_count)
}

/// Builds a rewriter that masks an email's local part while preserving the
/// domain, keeping the first `visible_prefix` characters visible.
///
/// Non-email inputs are masked like a prefix-keep rule. Empty input redacts
/// to [`REDACTED_PLACEHOLDER`].
#[must_use]
pub fn mask_email_local(visible_prefix: usize) -> Rewriter {
    Arc::new(move |value: &str, _pattern: &Regex| {
        if value.is_empty() {
            return REDACTED_PLACEHOLDER.to_string();
        }
        if let Some(at_pos) = value.find('@') {
            let local = &value[..at_pos];
            let domain = &value[at_pos..]; // includes the @
            let local_chars: Vec<char> = local.chars().collect();
            if visible_prefix >= local_chars.len() {
                return value.to_string();
            }
            let visible: String = local_chars[..visible_prefix].iter().collect();
            let masked: String =
                std::iter::repeat_n(MASK_CHAR, local_chars.len() - visible_prefix).collect();
            format!("{visible}{masked}{domain}")
        } else {
            let mut chars: Vec<char> = value.chars().collect();
            if visible_prefix >= chars.len() {
                return value.to_string();
            }
            for ch in &mut chars[visible_prefix..] {
                *ch = MASK_CHAR;
            }
            chars.into_iter().collect()
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
