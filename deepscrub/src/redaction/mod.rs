//! Redaction traversal and entrypoints.
//!
//! This module provides the machinery that applies the policy configuration
//! from `crate::policy` to a value graph:
//!
//! - **`cycle`**: cycle detection and neutralization (the pre-pass)
//! - **`matcher`**: glob-style path pattern matching
//! - **`transform`**: value classification and the kind-transformer registry
//! - **`engine`**: the traversal engine: `Redactor`, its builder, the
//!   explicit work stack, and policy precedence
//! - **`json`**: textual serialization of redacted output

pub mod cycle;
mod engine;
pub mod json;
pub mod matcher;
pub mod transform;

pub use engine::{PathPattern, Redacted, Redactor, RedactorBuilder};
pub use matcher::SegmentMatcher;
pub use transform::{StructuredKind, Transformer, TransformerRegistry, TypeTag, classify};
