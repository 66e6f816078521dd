//! Ledger files on disk.

use crate::domain::layout::LedgerLayout;
use crate::domain::record::{parse_ledger, LedgerRecord};
use crate::errors::LedgerParseError;
use std::path::Path;
use tracing::info;

/// Read and parse the ledger at `path`.
pub fn load_ledger(path: &Path, layout: &LedgerLayout) -> Result<Vec<LedgerRecord>, LedgerParseError> {
    let text = std::fs::read_to_string(path).map_err(|e| LedgerParseError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let records = parse_ledger(&text, layout)?;
    info!(path = %path.display(), records = records.len(), "Loaded ledger");
    Ok(records)
}
