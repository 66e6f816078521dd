//! Submission settings.

use serde::{Deserialize, Serialize};
use shared_types::U256;

/// How the invoker sizes and prices transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Fixed gas limit. When unset the node's estimate plus headroom is used.
    pub gas_limit: Option<u64>,
    /// Percent added on top of the node's gas estimate.
    pub gas_headroom_percent: u64,
    /// Fixed gas price in base units. When unset the node's suggestion is used.
    pub gas_price: Option<U256>,
    /// Chain id for replay protection. When unset it is asked from the node once.
    pub chain_id: Option<u64>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            gas_limit: None,
            gas_headroom_percent: 25,
            gas_price: None,
            chain_id: None,
        }
    }
}

impl InvokerConfig {
    /// Apply the headroom to a node estimate, saturating at `u64::MAX`.
    pub fn padded(&self, estimate: u64) -> u64 {
        let factor = 100 + u128::from(self.gas_headroom_percent);
        let padded = u128::from(estimate).saturating_mul(factor) / 100;
        u64::try_from(padded).unwrap_or(u64::MAX)
    }
}
