//! Crate error type.
//!
//! Redaction itself is total: unmatched paths, keys, and string tests simply
//! leave values unchanged, and cyclic input degrades to a marker value. The
//! only fallible surface is textual serialization, which fails when a
//! structured kind reaches the serializer without a registered transformer
//! having converted it.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors surfaced by the redaction entrypoints.
#[derive(Clone, Copy, Debug, Error)]
pub enum Error {
    /// A value kind reached the serializer without a registered transformer.
    ///
    /// This is surfaced as-is from the serialization layer; the traversal
    /// engine never intercepts it. Callers needing guaranteed-serializable
    /// output must register transformers for every non-plain kind they pass.
    #[error("no transformer registered for value kind {kind:?}; cannot serialize")]
    Unserializable {
        /// The offending value's classification.
        kind: ValueKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<Error>();
    }

    #[test]
    fn unserializable_names_the_kind() {
        let err = Error::Unserializable {
            kind: ValueKind::BigInt,
        };
        assert!(err.to_string().contains("BigInt"));
    }
}
