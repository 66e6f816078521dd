//! Batch payout domain: the plan and its report.

pub mod plan;
pub mod report;

pub use plan::{PayoutEntry, PayoutPlan};
pub use report::{PayoutLine, PayoutReport, PayoutStatus};
