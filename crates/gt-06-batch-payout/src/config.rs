//! Batch run settings.

use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::HashSet;
use std::time::Duration;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Delay between consecutive broadcasts.
    pub pacing_ms: u64,
    /// Reserved addresses that are never paid.
    pub excluded: Vec<Address>,
    /// Read each destination's balance after its transfer confirms.
    pub check_balance_after: bool,
    /// Refuse to start if the sender cannot cover the plan total.
    pub require_funds: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 500,
            excluded: Vec::new(),
            check_balance_after: true,
            require_funds: true,
        }
    }
}

impl BatchConfig {
    /// Pacing delay as a duration.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Excluded addresses as a set.
    pub fn excluded_set(&self) -> HashSet<Address> {
        self.excluded.iter().copied().collect()
    }
}
