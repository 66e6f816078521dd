//! Ledger totals for operator review before paying out.

use super::aggregate::AggregatedLedger;
use gt_01_numeric::to_decimal;
use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::fmt;

/// Counts and sums of one or more aggregated ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Records folded into payable totals.
    pub records: usize,
    /// Distinct payable destinations.
    pub destinations: usize,
    /// Sum over payable destinations.
    pub payable_total: U256,
    /// Records that went to excluded addresses.
    pub excluded_records: usize,
    /// Sum over excluded addresses.
    pub excluded_total: U256,
    /// Payable plus excluded. `None` if the sum overflows.
    pub grand_total: Option<U256>,
}

/// The empty summary: the identity of [`LedgerSummary::combine`].
impl Default for LedgerSummary {
    fn default() -> Self {
        Self {
            records: 0,
            destinations: 0,
            payable_total: U256::zero(),
            excluded_records: 0,
            excluded_total: U256::zero(),
            grand_total: Some(U256::zero()),
        }
    }
}

impl LedgerSummary {
    /// Summary of a single ledger.
    pub fn of(ledger: &AggregatedLedger) -> Self {
        Self {
            records: ledger.record_count(),
            destinations: ledger.len(),
            payable_total: ledger.total(),
            excluded_records: ledger.excluded_records(),
            excluded_total: ledger.excluded_total(),
            grand_total: ledger.total().checked_add(ledger.excluded_total()),
        }
    }

    /// Summary of two ledgers paid from the same account.
    ///
    /// Destinations are counted per ledger, not deduplicated across them.
    pub fn combine(&self, other: &Self) -> Self {
        let payable = self.payable_total.checked_add(other.payable_total);
        let excluded = self.excluded_total.checked_add(other.excluded_total);
        Self {
            records: self.records + other.records,
            destinations: self.destinations + other.destinations,
            payable_total: payable.unwrap_or(U256::MAX),
            excluded_records: self.excluded_records + other.excluded_records,
            excluded_total: excluded.unwrap_or(U256::MAX),
            grand_total: self
                .grand_total
                .zip(other.grand_total)
                .and_then(|(a, b)| a.checked_add(b)),
        }
    }
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "payable:  {} ({} records, {} destinations) = {} coins",
            self.payable_total,
            self.records,
            self.destinations,
            to_decimal(self.payable_total)
        )?;
        writeln!(
            f,
            "excluded: {} ({} records) = {} coins",
            self.excluded_total,
            self.excluded_records,
            to_decimal(self.excluded_total)
        )?;
        match self.grand_total {
            Some(total) => write!(f, "total:    {total} = {} coins", to_decimal(total)),
            None => f.write_str("total:    overflows 256 bits"),
        }
    }
}
