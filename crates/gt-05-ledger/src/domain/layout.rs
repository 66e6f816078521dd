//! # Ledger Layouts
//!
//! Column positions are fixed per file kind. Columns are 0-based.
//!
//! | Preset | Source | Destination | Magnitude | Format |
//! |--------|--------|-------------|-----------|--------|
//! | `validator` | - | 0 | 2 | integer base units |
//! | `validator-voters` | - | 0 | 4 | integer base units |
//! | `voter` | 1 | 2 | 4 | integer base units |
//! | `voter-decimal` | 1 | 2 | 3 | decimal coins |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the magnitude column is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeFormat {
    /// Non-negative integer already in base units.
    Integer,
    /// Decimal coin amount, scaled by 10^18 with truncation.
    Decimal,
}

/// Where the fields of one ledger kind live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLayout {
    /// Field separator.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Column of the address that is paid.
    pub destination: usize,
    /// Column of the address the payment is attributed to, if any.
    #[serde(default)]
    pub source: Option<usize>,
    /// Column of the amount.
    pub magnitude: usize,
    /// How the amount is written.
    pub format: MagnitudeFormat,
}

fn default_delimiter() -> char {
    ','
}

impl LedgerLayout {
    /// Validator payout file: address, _, amount.
    pub const VALIDATOR_PAYOUT: Self = Self::integer(0, None, 2);
    /// Validator file read for the total of its voters' contributions.
    pub const VALIDATOR_VOTER_TOTAL: Self = Self::integer(0, None, 4);
    /// Voter payout file: _, validator, voter, _, amount.
    pub const VOTER_PAYOUT: Self = Self::integer(2, Some(1), 4);
    /// Voter payout file with the decimal coin column.
    pub const VOTER_PAYOUT_DECIMAL: Self = Self {
        delimiter: ',',
        destination: 2,
        source: Some(1),
        magnitude: 3,
        format: MagnitudeFormat::Decimal,
    };

    const fn integer(destination: usize, source: Option<usize>, magnitude: usize) -> Self {
        Self {
            delimiter: ',',
            destination,
            source,
            magnitude,
            format: MagnitudeFormat::Integer,
        }
    }

    /// Number of fields a row must have at least.
    pub fn min_fields(&self) -> usize {
        let highest = self.destination.max(self.magnitude);
        self.source.map_or(highest, |s| highest.max(s)) + 1
    }
}

impl FromStr for LedgerLayout {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "validator" => Ok(Self::VALIDATOR_PAYOUT),
            "validator-voters" => Ok(Self::VALIDATOR_VOTER_TOTAL),
            "voter" => Ok(Self::VOTER_PAYOUT),
            "voter-decimal" => Ok(Self::VOTER_PAYOUT_DECIMAL),
            other => Err(format!(
                "unknown ledger layout {other:?} (expected validator, validator-voters, voter or voter-decimal)"
            )),
        }
    }
}

impl fmt::Display for LedgerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "destination={} magnitude={}", self.destination, self.magnitude)?;
        if let Some(source) = self.source {
            write!(f, " source={source}")?;
        }
        write!(f, " format={:?}", self.format)
    }
}
