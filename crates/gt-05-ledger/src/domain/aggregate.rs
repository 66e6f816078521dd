//! # Aggregation and Reconciliation
//!
//! All sums are exact `U256` additions with overflow checks. Totals are
//! keyed in a `BTreeMap`, so neither record order nor grouping changes the
//! result or the iteration order.

use super::record::LedgerRecord;
use crate::errors::LedgerParseError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Per-address totals built from one set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedLedger {
    totals: BTreeMap<Address, U256>,
    total: U256,
    records: usize,
    excluded: BTreeMap<Address, U256>,
    excluded_total: U256,
    excluded_records: usize,
}

impl AggregatedLedger {
    /// Total for `address`, if it appears.
    pub fn get(&self, address: &Address) -> Option<U256> {
        self.totals.get(address).copied()
    }

    /// Number of distinct addresses.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// No addresses at all.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// `(address, total)` in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.totals.iter()
    }

    /// Sum over every address.
    pub fn total(&self) -> U256 {
        self.total
    }

    /// Records folded into the totals.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Totals of excluded addresses, kept apart.
    pub fn excluded(&self) -> &BTreeMap<Address, U256> {
        &self.excluded
    }

    /// Sum over excluded addresses.
    pub fn excluded_total(&self) -> U256 {
        self.excluded_total
    }

    /// Records that went to excluded addresses.
    pub fn excluded_records(&self) -> usize {
        self.excluded_records
    }

    /// Consume into the per-address totals.
    pub fn into_totals(self) -> BTreeMap<Address, U256> {
        self.totals
    }

    fn add(&mut self, address: Address, amount: U256) -> Result<(), LedgerParseError> {
        let overflow = || LedgerParseError::Overflow { address };
        let slot = self.totals.entry(address).or_default();
        *slot = slot.checked_add(amount).ok_or_else(overflow)?;
        self.total = self.total.checked_add(amount).ok_or_else(overflow)?;
        self.records += 1;
        Ok(())
    }

    fn add_excluded(&mut self, address: Address, amount: U256) -> Result<(), LedgerParseError> {
        let overflow = || LedgerParseError::Overflow { address };
        let slot = self.excluded.entry(address).or_default();
        *slot = slot.checked_add(amount).ok_or_else(overflow)?;
        self.excluded_total = self.excluded_total.checked_add(amount).ok_or_else(overflow)?;
        self.excluded_records += 1;
        Ok(())
    }
}

impl FromIterator<(Address, U256)> for AggregatedLedger {
    /// Builds a ledger from already-unique totals; later duplicates add up.
    fn from_iter<I: IntoIterator<Item = (Address, U256)>>(iter: I) -> Self {
        let mut ledger = Self::default();
        for (address, amount) in iter {
            // Saturate rather than fail: this path is for hand-built ledgers.
            let slot = ledger.totals.entry(address).or_default();
            *slot = slot.saturating_add(amount);
            ledger.total = ledger.total.saturating_add(amount);
            ledger.records += 1;
        }
        ledger
    }
}

/// Sum magnitudes per destination.
///
/// Records whose destination is in `excluded` are tallied separately and
/// left out of the payable totals.
pub fn aggregate(
    records: &[LedgerRecord],
    excluded: &HashSet<Address>,
) -> Result<AggregatedLedger, LedgerParseError> {
    let mut ledger = AggregatedLedger::default();
    for record in records {
        if excluded.contains(&record.destination) {
            ledger.add_excluded(record.destination, record.magnitude)?;
        } else {
            ledger.add(record.destination, record.magnitude)?;
        }
    }
    debug!(
        records = records.len(),
        destinations = ledger.len(),
        excluded = ledger.excluded_records,
        "Aggregated ledger"
    );
    Ok(ledger)
}

/// Sum magnitudes per source address (e.g. voter rewards per validator).
pub fn group_by_source(records: &[LedgerRecord]) -> Result<AggregatedLedger, LedgerParseError> {
    let mut ledger = AggregatedLedger::default();
    for record in records {
        let source = record
            .source
            .ok_or(LedgerParseError::MissingSource { line: record.line })?;
        ledger.add(source, record.magnitude)?;
    }
    Ok(ledger)
}

/// Index records by destination, failing if any destination repeats.
pub fn index_unique(records: &[LedgerRecord]) -> Result<AggregatedLedger, LedgerParseError> {
    let mut first_seen: BTreeMap<Address, usize> = BTreeMap::new();
    let mut ledger = AggregatedLedger::default();
    for record in records {
        match first_seen.entry(record.destination) {
            Entry::Occupied(first) => {
                return Err(LedgerParseError::DuplicateDestination {
                    address: record.destination,
                    line: record.line,
                    first_line: *first.get(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(record.line);
            }
        }
        ledger.add(record.destination, record.magnitude)?;
    }
    Ok(ledger)
}

/// An address whose totals differ between two ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Address in question.
    pub address: Address,
    /// Total in the left ledger; `None` if absent there.
    pub left: Option<U256>,
    /// Total in the right ledger; `None` if absent there.
    pub right: Option<U256>,
}

impl Discrepancy {
    /// Absolute difference, treating a missing side as zero.
    pub fn difference(&self) -> U256 {
        let left = self.left.unwrap_or_default();
        let right = self.right.unwrap_or_default();
        if left > right {
            left - right
        } else {
            right - left
        }
    }
}

/// Every address whose totals differ, in address order.
///
/// An address present on one side only is reported with `None` on the
/// other. Identical ledgers yield an empty list.
pub fn reconcile(left: &AggregatedLedger, right: &AggregatedLedger) -> Vec<Discrepancy> {
    let mut found = Vec::new();
    for (address, amount) in left.iter() {
        let other = right.get(address);
        if other != Some(*amount) {
            found.push(Discrepancy {
                address: *address,
                left: Some(*amount),
                right: other,
            });
        }
    }
    for (address, amount) in right.iter() {
        if left.get(address).is_none() {
            found.push(Discrepancy {
                address: *address,
                left: None,
                right: Some(*amount),
            });
        }
    }
    found.sort_by(|a, b| a.address.cmp(&b.address));
    found
}
