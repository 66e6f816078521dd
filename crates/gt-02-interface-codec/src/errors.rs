//! # Error Types
//!
//! Encoding errors are fatal to the single call that raised them and are
//! never retried.

use thiserror::Error;

/// Errors raised while describing, encoding or decoding contract calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The method is not part of the interface description.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Wrong number of call arguments.
    #[error("{method} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// An argument is not representable as its declared parameter type.
    #[error("argument {param} is not a valid {expected}: {reason}")]
    TypeMismatch {
        param: String,
        expected: String,
        reason: String,
    },

    /// Returned data is shorter than the declared outputs require.
    #[error("output too short: need at least {expected} bytes, got {actual}")]
    UnderflowingOutput { expected: usize, actual: usize },

    /// Returned data is long enough but not a valid encoding.
    #[error("invalid output encoding: {0}")]
    InvalidOutput(String),

    /// A type string could not be parsed.
    #[error("invalid parameter type: {0:?}")]
    InvalidType(String),

    /// Two methods share a name inside one description.
    #[error("duplicate method: {0}")]
    DuplicateMethod(String),

    /// An interface description document could not be read.
    #[error("invalid interface description: {0}")]
    InvalidDescription(String),

    /// No interface or address is registered under this contract name.
    #[error("unknown contract: {0}")]
    UnknownContract(String),
}

impl CodecError {
    pub(crate) fn mismatch(
        param: impl Into<String>,
        expected: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            param: param.into(),
            expected: expected.to_string(),
            reason: reason.into(),
        }
    }
}
