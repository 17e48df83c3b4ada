//! Redaction policy configuration.
//!
//! This module provides the declarative half of the system:
//!
//! - **`overrides`**: replacement variants, per-pattern override records,
//!   global defaults, and their resolution
//! - **`text`**: string-content rules and text replacement helpers
//!
//! The traversal machinery that applies these records lives in
//! `crate::redaction`.

mod overrides;
pub mod text;

pub use overrides::{PatternPolicy, PolicyDefaults, Replacement, ResolvedPolicy};
pub use text::{
    MASK_CHAR, REDACTED_PLACEHOLDER, Rewriter, StringTest, mask_email_local, repeat_by_length,
};
