//! Path pattern matching.
//!
//! This module provides:
//!
//! - [`SegmentMatcher`]: one element of a path pattern: literal, regex,
//!   `*` (exactly one segment), or `**` (zero or more segments)
//! - [`matches`]: the two-pointer wildcard matcher
//!
//! Literal comparison honors the orthogonal `fuzzy` and `case_sensitive`
//! flags: exact equality; case-insensitive (lower-case and strip
//! non-alphanumeric characters, so `userName`, `user_name`, and `USER-NAME`
//! are equivalent);
//! fuzzy (substring containment); or containment after normalization.
//! Sequence indices compare through their decimal form, so a literal `"0"`
//! matches index `0`.
//!
//! Patterns are assumed well-formed; malformed configuration is the caller's
//! responsibility.

use regex::Regex;

use crate::value::Segment;

// =============================================================================
// SegmentMatcher
// =============================================================================

/// One element of a path pattern.
#[derive(Clone, Debug)]
pub enum SegmentMatcher {
    /// Matches one segment under the configured comparison mode.
    Literal(String),
    /// Matches one segment whose text satisfies the pattern.
    Regex(Regex),
    /// Matches exactly one segment, unconditionally. Written `*`.
    Wildcard,
    /// Matches zero or more segments. Written `**`.
    Globstar,
}

impl SegmentMatcher {
    /// Shorthand for a literal matcher.
    #[must_use]
    pub fn literal<T: Into<String>>(text: T) -> Self {
        Self::Literal(text.into())
    }
}

impl From<&str> for SegmentMatcher {
    /// Parses the wildcard spellings; any other text is a literal.
    fn from(text: &str) -> Self {
        match text {
            "*" => Self::Wildcard,
            "**" => Self::Globstar,
            other => Self::Literal(other.to_string()),
        }
    }
}

// =============================================================================
// Key comparison
// =============================================================================

/// Lower-cases and strips every non-alphanumeric character, so different
/// cases and separators of the same logical name compare equal.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compares a concrete segment against a literal under the configured mode.
fn literal_matches(literal: &str, segment: &str, fuzzy: bool, case_sensitive: bool) -> bool {
    if case_sensitive {
        if fuzzy {
            segment.contains(literal)
        } else {
            segment == literal
        }
    } else {
        let literal = normalize_key(literal);
        let segment = normalize_key(segment);
        if fuzzy {
            segment.contains(&literal)
        } else {
            segment == literal
        }
    }
}

fn segment_matches(
    matcher: &SegmentMatcher,
    segment: &Segment,
    fuzzy: bool,
    case_sensitive: bool,
) -> bool {
    match matcher {
        SegmentMatcher::Literal(literal) => {
            literal_matches(literal, &segment.as_text(), fuzzy, case_sensitive)
        }
        SegmentMatcher::Regex(pattern) => pattern.is_match(&segment.as_text()),
        SegmentMatcher::Wildcard => true,
        // Globstar consumption is handled by the outer matcher loop.
        SegmentMatcher::Globstar => false,
    }
}

// =============================================================================
// Pattern matching
// =============================================================================

/// Whether `path` matches `pattern` in full.
///
/// Classic two-pointer wildcard matching: `**` is consumed greedily with a
/// single checkpoint remembering the most recent `**` position and path
/// offset; on a later mismatch the path pointer is advanced from that
/// checkpoint and matching retries. A trailing `**` matches a path that ends
/// exactly where the pattern's literal prefix ends.
#[must_use]
pub fn matches(
    path: &[Segment],
    pattern: &[SegmentMatcher],
    fuzzy: bool,
    case_sensitive: bool,
) -> bool {
    let mut p = 0; // pattern cursor
    let mut s = 0; // path cursor
    let mut checkpoint: Option<(usize, usize)> = None;

    while s < path.len() {
        if p < pattern.len() && matches!(pattern[p], SegmentMatcher::Globstar) {
            // Try consuming zero segments first; remember where to backtrack.
            checkpoint = Some((p, s));
            p += 1;
        } else if p < pattern.len() && segment_matches(&pattern[p], &path[s], fuzzy, case_sensitive)
        {
            p += 1;
            s += 1;
        } else if let Some((star_p, star_s)) = checkpoint {
            // Mismatch: let the most recent `**` absorb one more segment.
            p = star_p + 1;
            s = star_s + 1;
            checkpoint = Some((star_p, star_s + 1));
        } else {
            return false;
        }
    }

    // Path exhausted: only trailing `**` may remain.
    while p < pattern.len() && matches!(pattern[p], SegmentMatcher::Globstar) {
        p += 1;
    }
    p == pattern.len()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<Segment> {
        segments
            .iter()
            .map(|text| {
                text.parse::<usize>()
                    .map_or_else(|_| Segment::Key((*text).to_string()), Segment::Index)
            })
            .collect()
    }

    fn pattern(matchers: &[&str]) -> Vec<SegmentMatcher> {
        matchers.iter().map(|text| SegmentMatcher::from(*text)).collect()
    }

    fn exact(path_segments: &[&str], pattern_segments: &[&str]) -> bool {
        matches(&path(path_segments), &pattern(pattern_segments), false, true)
    }

    #[test]
    fn literal_pattern_requires_full_path() {
        assert!(exact(&["user", "password"], &["user", "password"]));
        assert!(!exact(&["user"], &["user", "password"]));
        assert!(!exact(&["user", "password", "hash"], &["user", "password"]));
    }

    #[test]
    fn wildcard_consumes_exactly_one_segment() {
        assert!(exact(&["user", "address", "city"], &["user", "address", "*"]));
        assert!(!exact(&["user", "address"], &["user", "address", "*"]));
        assert!(!exact(
            &["user", "address", "geo", "lat"],
            &["user", "address", "*"]
        ));
    }

    #[test]
    fn globstar_matches_at_any_depth() {
        let p = pattern(&["**", "ssn"]);
        assert!(matches(&path(&["ssn"]), &p, false, true));
        assert!(matches(&path(&["a", "ssn"]), &p, false, true));
        assert!(matches(&path(&["a", "b", "c", "ssn"]), &p, false, true));
        assert!(!matches(&path(&["a", "b", "c"]), &p, false, true));
    }

    #[test]
    fn globstar_backtracks_past_decoy_matches() {
        // The first `b` cannot terminate the match; `**` must re-absorb it.
        assert!(exact(&["a", "b", "x", "b", "c"], &["a", "**", "b", "c"]));
        assert!(!exact(&["a", "b", "x", "b"], &["a", "**", "b", "c"]));
    }

    #[test]
    fn trailing_globstar_matches_zero_segments() {
        assert!(exact(&["user", "secrets"], &["user", "secrets", "**"]));
        assert!(exact(
            &["user", "secrets", "a", "b"],
            &["user", "secrets", "**"]
        ));
        assert!(!exact(&["user"], &["user", "secrets", "**"]));
    }

    #[test]
    fn indices_match_their_decimal_form() {
        assert!(exact(&["items", "0", "token"], &["items", "0", "token"]));
        assert!(exact(&["items", "0", "token"], &["items", "*", "token"]));
        assert!(!exact(&["items", "1", "token"], &["items", "0", "token"]));
    }

    #[test]
    fn regex_matcher_tests_segment_text() {
        let p = vec![
            SegmentMatcher::literal("user"),
            SegmentMatcher::Regex(Regex::new("^(password|secret)$").expect("valid pattern")),
        ];
        assert!(matches(&path(&["user", "password"]), &p, false, true));
        assert!(matches(&path(&["user", "secret"]), &p, false, true));
        assert!(!matches(&path(&["user", "name"]), &p, false, true));
    }

    #[test]
    fn normalize_key_strips_separators_and_case() {
        assert_eq!(normalize_key("userName"), "username");
        assert_eq!(normalize_key("user_name"), "username");
        assert_eq!(normalize_key("USER-NAME"), "username");
        assert_eq!(normalize_key("user.name"), "username");
    }

    #[test]
    fn case_insensitive_mode_normalizes_separators_and_case() {
        let p = pattern(&["userName"]);
        assert!(matches(&path(&["user_name"]), &p, false, false));
        assert!(matches(&path(&["USER-NAME"]), &p, false, false));
        assert!(matches(&path(&["username"]), &p, false, false));
        assert!(!matches(&path(&["user_name"]), &p, false, true));
    }

    #[test]
    fn fuzzy_mode_uses_substring_containment() {
        let p = pattern(&["pass"]);
        assert!(matches(&path(&["password"]), &p, true, true));
        assert!(matches(&path(&["passphrase"]), &p, true, true));
        assert!(!matches(&path(&["password"]), &p, false, true));
        // Fuzzy plus case-insensitive: containment after normalization.
        assert!(matches(&path(&["USER_PASSWORD"]), &pattern(&["pass"]), true, false));
    }

    #[test]
    fn empty_pattern_matches_only_empty_path() {
        assert!(matches(&[], &[], false, true));
        assert!(!matches(&path(&["a"]), &[], false, true));
        // A bare `**` matches everything, including the empty path.
        assert!(matches(&[], &pattern(&["**"]), false, true));
        assert!(matches(&path(&["a", "b"]), &pattern(&["**"]), false, true));
    }
}
