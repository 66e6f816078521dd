//! Ledger error types.

use shared_types::Address;
use std::path::PathBuf;
use thiserror::Error;

/// A ledger could not be turned into totals.
///
/// Any of these aborts the whole file: a partially aggregated ledger is
/// never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerParseError {
    /// A row did not match its layout.
    #[error("line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the file.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// The same destination appeared twice where it must be unique.
    #[error("line {line}: {address} already appeared on line {first_line}")]
    DuplicateDestination {
        /// Repeated address.
        address: Address,
        /// Line of the repeat.
        line: usize,
        /// Line where it first appeared.
        first_line: usize,
    },

    /// Grouping by source needs a source column.
    #[error("line {line}: record has no source address")]
    MissingSource {
        /// Line of the record.
        line: usize,
    },

    /// A sum exceeded 256 bits.
    #[error("total for {address} overflows 256 bits")]
    Overflow {
        /// Address whose total overflowed.
        address: Address,
    },

    /// The file could not be read.
    #[error("cannot read {path}: {reason}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },
}

impl LedgerParseError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}
