//! Pure ledger logic: layouts, parsing, aggregation, reconciliation.

pub mod aggregate;
pub mod layout;
pub mod record;
pub mod summary;

pub use aggregate::{aggregate, group_by_source, index_unique, reconcile, AggregatedLedger, Discrepancy};
pub use layout::{LedgerLayout, MagnitudeFormat};
pub use record::{parse_ledger, parse_record, LedgerRecord};
pub use summary::LedgerSummary;
