//! # Payout Report
//!
//! One line per planned destination. Only `Confirmed` and `Skipped` count
//! as settled; `TimedOut` transfers may still land and are listed apart so
//! they are rechecked rather than paid twice.

use super::plan::{PayoutEntry, PayoutPlan};
use gt_01_numeric::to_decimal;
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockHeight, TxHash, U256};
use std::collections::HashSet;
use std::fmt;

/// What happened to one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Included with a success status.
    Confirmed {
        hash: TxHash,
        block_height: BlockHeight,
    },
    /// Included with a failure status.
    Reverted {
        hash: TxHash,
        reason: Option<String>,
    },
    /// Nonce taken by another transaction; never included.
    Dropped { hash: TxHash },
    /// Broadcast, but no verdict in time. Recheck before resubmitting.
    ///
    /// `error` is set when polling itself failed rather than ran out of time.
    TimedOut {
        hash: TxHash,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Never broadcast.
    SubmitFailed { error: String },
    /// Deliberately not paid.
    Skipped { reason: String },
    /// The run stopped before reaching this entry.
    NotAttempted,
}

impl PayoutStatus {
    /// Paid, or nothing to pay.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Skipped { .. })
    }

    /// Broadcast with no verdict; the transfer may still land.
    pub fn is_in_doubt(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Hash of the broadcast transaction, if there was one.
    pub fn hash(&self) -> Option<TxHash> {
        match self {
            Self::Confirmed { hash, .. }
            | Self::Reverted { hash, .. }
            | Self::Dropped { hash }
            | Self::TimedOut { hash, .. } => Some(*hash),
            _ => None,
        }
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { hash, block_height } => {
                write!(f, "confirmed {hash} at block {block_height}")
            }
            Self::Reverted { hash, reason } => write!(
                f,
                "reverted {hash}: {}",
                reason.as_deref().unwrap_or("no reason")
            ),
            Self::Dropped { hash } => write!(f, "dropped {hash}"),
            Self::TimedOut { hash, error: None } => write!(f, "timed out {hash}"),
            Self::TimedOut { hash, error: Some(error) } => {
                write!(f, "unconfirmed {hash}: {error}")
            }
            Self::SubmitFailed { error } => write!(f, "submit failed: {error}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::NotAttempted => f.write_str("not attempted"),
        }
    }
}

/// Result for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub destination: Address,
    pub amount: U256,
    pub status: PayoutStatus,
    /// Destination balance read after confirmation, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<U256>,
}

/// Everything a batch run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReport {
    pub lines: Vec<PayoutLine>,
}

impl PayoutReport {
    pub(crate) fn push(&mut self, entry: &PayoutEntry, status: PayoutStatus) -> &mut PayoutLine {
        self.lines.push(PayoutLine {
            destination: entry.destination,
            amount: entry.amount,
            status,
            balance_after: None,
        });
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Lines that did not settle and are not in doubt, ready to rerun.
    pub fn unsettled(&self) -> PayoutPlan {
        PayoutPlan::from_unique(
            self.lines
                .iter()
                .filter(|line| !line.status.is_settled() && !line.status.is_in_doubt())
                .map(|line| PayoutEntry {
                    destination: line.destination,
                    amount: line.amount,
                }),
        )
    }

    /// Destinations a rerun must leave alone: paid, skipped, or possibly
    /// still landing.
    pub fn settled_or_in_doubt(&self) -> HashSet<Address> {
        self.lines
            .iter()
            .filter(|line| line.status.is_settled() || line.status.is_in_doubt())
            .map(|line| line.destination)
            .collect()
    }

    /// Transfers that were broadcast but have no verdict.
    pub fn in_doubt(&self) -> Vec<(Address, TxHash)> {
        self.lines
            .iter()
            .filter_map(|line| match line.status {
                PayoutStatus::TimedOut { hash, .. } => Some((line.destination, hash)),
                _ => None,
            })
            .collect()
    }

    /// Sum over confirmed lines.
    pub fn confirmed_total(&self) -> U256 {
        self.lines
            .iter()
            .filter(|line| matches!(line.status, PayoutStatus::Confirmed { .. }))
            .fold(U256::zero(), |acc, line| acc.saturating_add(line.amount))
    }

    /// Number of confirmed lines.
    pub fn confirmed(&self) -> usize {
        self.count(|s| matches!(s, PayoutStatus::Confirmed { .. }))
    }

    /// Number of lines that were neither confirmed nor skipped.
    pub fn failed(&self) -> usize {
        self.count(|s| !s.is_settled())
    }

    fn count(&self, predicate: impl Fn(&PayoutStatus) -> bool) -> usize {
        self.lines.iter().filter(|line| predicate(&line.status)).count()
    }
}

impl fmt::Display for PayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{} {} {}", line.destination, to_decimal(line.amount), line.status)?;
        }
        write!(
            f,
            "{} of {} confirmed, {} coins paid, {} unsettled",
            self.confirmed(),
            self.lines.len(),
            to_decimal(self.confirmed_total()),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u64) -> PayoutEntry {
        PayoutEntry {
            destination: Address::from_low_u64(n),
            amount: U256::exp10(18) * n,
        }
    }

    fn hash(n: u8) -> TxHash {
        TxHash([n; 32])
    }

    fn sample() -> PayoutReport {
        let mut report = PayoutReport::default();
        report.push(&entry(1), PayoutStatus::Confirmed { hash: hash(1), block_height: 5 });
        report.push(&entry(2), PayoutStatus::Reverted { hash: hash(2), reason: None });
        report.push(&entry(3), PayoutStatus::TimedOut { hash: hash(3), error: None });
        report.push(&entry(4), PayoutStatus::SubmitFailed { error: "connection refused".into() });
        report.push(&entry(5), PayoutStatus::Skipped { reason: "excluded".into() });
        report.push(&entry(6), PayoutStatus::NotAttempted);
        report
    }

    #[test]
    fn test_unsettled_excludes_in_doubt() {
        let report = sample();
        let rerun: Vec<_> = report.unsettled().entries().iter().map(|e| e.destination).collect();
        assert_eq!(
            rerun,
            vec![Address::from_low_u64(2), Address::from_low_u64(4), Address::from_low_u64(6)]
        );
        assert_eq!(report.in_doubt(), vec![(Address::from_low_u64(3), hash(3))]);
        assert_eq!(
            report.settled_or_in_doubt(),
            HashSet::from([Address::from_low_u64(1), Address::from_low_u64(3), Address::from_low_u64(5)])
        );
    }

    #[test]
    fn test_totals_and_display() {
        let report = sample();
        assert_eq!(report.confirmed(), 1);
        assert_eq!(report.failed(), 4);
        assert_eq!(report.confirmed_total(), U256::exp10(18));
        let text = report.to_string();
        assert!(text.ends_with("1 of 6 confirmed, 1 coins paid, 4 unsettled"));
        assert!(text.contains("submit failed: connection refused"));
    }

    #[test]
    fn test_lost_confirmation_keeps_its_error() {
        let status = PayoutStatus::TimedOut {
            hash: hash(9),
            error: Some("receipt polling failed 4 times".into()),
        };
        assert!(status.is_in_doubt());
        assert!(status.to_string().ends_with(": receipt polling failed 4 times"));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["error"], "receipt polling failed 4 times");
        let back: PayoutStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, status);

        let plain = serde_json::to_value(PayoutStatus::TimedOut { hash: hash(9), error: None }).unwrap();
        assert!(plain.get("error").is_none());
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_value(PayoutStatus::Skipped { reason: "zero".into() }).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(PayoutStatus::Dropped { hash: hash(7) }.hash(), Some(hash(7)));
        assert_eq!(PayoutStatus::NotAttempted.hash(), None);
    }
}
