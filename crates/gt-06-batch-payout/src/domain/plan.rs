//! Ordered list of transfers to make.

use crate::errors::BatchError;
use gt_05_ledger::AggregatedLedger;
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// One transfer of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEntry {
    /// Address to pay.
    pub destination: Address,
    /// Amount in base units.
    pub amount: U256,
}

/// Transfers in submission order, one per destination.
///
/// Serialized as a bare list of entries; deserializing goes through
/// [`PayoutPlan::from_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PayoutEntry>", into = "Vec<PayoutEntry>")]
pub struct PayoutPlan {
    entries: Vec<PayoutEntry>,
}

impl TryFrom<Vec<PayoutEntry>> for PayoutPlan {
    type Error = BatchError;

    fn try_from(entries: Vec<PayoutEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<PayoutPlan> for Vec<PayoutEntry> {
    fn from(plan: PayoutPlan) -> Self {
        plan.entries
    }
}

impl PayoutPlan {
    /// Plan from arbitrary entries, in first-seen order.
    ///
    /// A destination listed more than once is paid the sum of its amounts;
    /// zero totals are left out.
    ///
    /// # Errors
    ///
    /// `AmountOverflow` when a destination's sum does not fit in 256 bits.
    pub fn from_entries(
        entries: impl IntoIterator<Item = PayoutEntry>,
    ) -> Result<Self, BatchError> {
        let mut slots: HashMap<Address, usize> = HashMap::new();
        let mut merged: Vec<PayoutEntry> = Vec::new();
        for entry in entries {
            match slots.entry(entry.destination) {
                Entry::Occupied(slot) => {
                    let existing = &mut merged[*slot.get()];
                    existing.amount = existing.amount.checked_add(entry.amount).ok_or(
                        BatchError::AmountOverflow {
                            destination: entry.destination,
                        },
                    )?;
                }
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push(entry);
                }
            }
        }
        Ok(Self::from_unique(merged))
    }

    /// Entries already keyed by destination; only zero amounts are dropped.
    pub(crate) fn from_unique(entries: impl IntoIterator<Item = PayoutEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter(|entry| !entry.amount.is_zero())
                .collect(),
        }
    }

    /// Plan from an aggregated ledger, in address order.
    ///
    /// Zero totals are left out, as are the ledger's excluded addresses
    /// (those never reach its payable totals).
    pub fn from_ledger(ledger: &AggregatedLedger) -> Self {
        Self::from_unique(ledger.iter().map(|(destination, amount)| PayoutEntry {
            destination: *destination,
            amount: *amount,
        }))
    }

    /// Same plan minus every destination in `settled`.
    pub fn without(&self, settled: &HashSet<Address>) -> Self {
        Self::from_unique(
            self.entries
                .iter()
                .filter(|entry| !settled.contains(&entry.destination))
                .copied(),
        )
    }

    /// Entries in order.
    pub fn entries(&self) -> &[PayoutEntry] {
        &self.entries
    }

    /// Number of transfers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing to pay.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all amounts; `None` on overflow.
    pub fn total(&self) -> Option<U256> {
        self.entries
            .iter()
            .try_fold(U256::zero(), |acc, entry| acc.checked_add(entry.amount))
    }
}
