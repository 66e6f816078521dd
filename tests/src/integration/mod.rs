//! End-to-end flows.

pub mod governance_flow;
pub mod nonce_race;
pub mod payout_flow;
