//! Deep redaction of dynamic nested data.
//!
//! This crate separates:
//! - **Policy**: what redacted data becomes (replacement variants, override
//!   records, string-content rules).
//! - **Traversal**: how a value graph is walked safely (cycle
//!   neutralization, glob path matching, kind transformation).
//!
//! A [`Redactor`] is built once from declarative configuration and applied
//! to any number of [`Value`] graphs via [`Redactor::redact`].
//!
//! What this crate does:
//! - masks, removes, or transforms fields selected by glob path patterns
//! - redacts string content matched by ordered regex rules, anywhere
//! - survives cyclic references by degrading them to path markers
//! - converts non-plain kinds (dates, errors, regexes, maps, sets, URLs,
//!   big integers) into serialization-safe marker mappings
//!
//! What it does not do:
//! - validate configuration (malformed patterns are the caller's problem)
//! - stream: it operates on an in-memory graph, not on bytes
//! - guarantee every kind is representable; kinds without a registered
//!   transformer pass through, and serializing them is an error

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod error;
pub mod policy;
pub mod redaction;
pub mod value;

pub use error::Error;
// Re-exports from policy module
pub use policy::{
    MASK_CHAR, PatternPolicy, PolicyDefaults, REDACTED_PLACEHOLDER, Replacement, ResolvedPolicy,
    Rewriter, StringTest, mask_email_local, repeat_by_length,
};
// Re-exports from redaction module
pub use redaction::{
    PathPattern, Redacted, Redactor, RedactorBuilder, SegmentMatcher, StructuredKind, Transformer,
    TransformerRegistry, TypeTag, classify,
};
pub use value::{Segment, Value, ValueKind, display_path};
