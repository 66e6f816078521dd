//! # Batch Payout Driver
//!
//! ```text
//! preflight (credential, funds)
//! for each entry:
//!   stop requested? ── yes ──> NotAttempted (rest of plan)
//!   zero / excluded? ── yes ──> Skipped
//!   sleep(pacing) unless first broadcast
//!   transfer ── Err ──> SubmitFailed, continue
//!   confirm  ──> Confirmed | Reverted | Dropped | TimedOut
//!   Confirmed && check_balance_after ──> balance_of(destination)
//! ```
//!
//! Transfers go out one at a time from a single sender, so nonces advance
//! in plan order. Nothing is retried within a run; rerun
//! [`PayoutReport::unsettled`] instead.

use crate::config::BatchConfig;
use crate::domain::{PayoutEntry, PayoutPlan, PayoutReport, PayoutStatus};
use crate::errors::BatchError;

use gt_01_numeric::to_decimal;
use gt_03_contract_invoker::ContractInvoker;
use gt_04_tx_confirmation::{TransactionConfirmer, TransactionOutcome};
use shared_crypto::Credential;
use shared_types::{Address, U256};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Pays a plan one transfer at a time.
pub struct BatchPayoutDriver {
    invoker: Arc<ContractInvoker>,
    confirmer: Arc<TransactionConfirmer>,
    config: BatchConfig,
}

impl std::fmt::Debug for BatchPayoutDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPayoutDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchPayoutDriver {
    pub fn new(
        invoker: Arc<ContractInvoker>,
        confirmer: Arc<TransactionConfirmer>,
        config: BatchConfig,
    ) -> Self {
        Self {
            invoker,
            confirmer,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Pay every entry of `plan` from `from`.
    pub async fn run(
        &self,
        plan: &PayoutPlan,
        from: Address,
        credential: &dyn Credential,
    ) -> Result<PayoutReport, BatchError> {
        let (_keep, stop) = watch::channel(false);
        self.run_until(plan, from, credential, stop).await
    }

    /// Like [`Self::run`], stopping before the next transfer once `stop`
    /// turns true. A transfer already broadcast is reported `TimedOut`.
    ///
    /// # Errors
    ///
    /// Only preflight failures; per-transfer failures land in the report.
    #[instrument(skip_all, fields(from = %from, transfers = plan.len()))]
    pub async fn run_until(
        &self,
        plan: &PayoutPlan,
        from: Address,
        credential: &dyn Credential,
        mut stop: watch::Receiver<bool>,
    ) -> Result<PayoutReport, BatchError> {
        let excluded = self.config.excluded_set();
        self.preflight(plan, from, credential).await?;

        let mut report = PayoutReport::default();
        let mut stopped = false;
        let mut broadcast_before = false;

        for entry in plan.entries() {
            stopped = stopped || *stop.borrow();
            if stopped {
                report.push(entry, PayoutStatus::NotAttempted);
                continue;
            }
            if entry.amount.is_zero() {
                report.push(entry, skipped("zero amount"));
                continue;
            }
            if excluded.contains(&entry.destination) {
                info!(destination = %entry.destination, "Skipping excluded address");
                report.push(entry, skipped("excluded address"));
                continue;
            }

            if broadcast_before {
                tokio::select! {
                    () = tokio::time::sleep(self.config.pacing()) => {}
                    () = stop_requested(&mut stop) => {
                        info!("Batch stopped");
                        stopped = true;
                        report.push(entry, PayoutStatus::NotAttempted);
                        continue;
                    }
                }
            }
            broadcast_before = true;

            let status = self.pay(entry, from, credential, &stop).await;
            let confirmed = matches!(status, PayoutStatus::Confirmed { .. });
            let line = report.push(entry, status);
            if confirmed && self.config.check_balance_after {
                match self.invoker.balance_of(entry.destination, None).await {
                    Ok(balance) => {
                        info!(
                            destination = %entry.destination,
                            balance = %to_decimal(balance),
                            "Balance after payout"
                        );
                        line.balance_after = Some(balance);
                    }
                    Err(e) => warn!(destination = %entry.destination, error = %e, "Balance check failed"),
                }
            }
        }

        info!(
            confirmed = report.confirmed(),
            unsettled = report.failed(),
            paid = %to_decimal(report.confirmed_total()),
            "Batch finished"
        );
        Ok(report)
    }

    async fn preflight(
        &self,
        plan: &PayoutPlan,
        from: Address,
        credential: &dyn Credential,
    ) -> Result<(), BatchError> {
        let signer = credential.address();
        if signer != from {
            return Err(BatchError::CredentialMismatch {
                expected: from,
                actual: signer,
            });
        }
        if !self.config.require_funds {
            return Ok(());
        }

        let excluded = self.config.excluded_set();
        let required = plan
            .entries()
            .iter()
            .filter(|entry| !excluded.contains(&entry.destination))
            .try_fold(U256::zero(), |acc, entry| acc.checked_add(entry.amount))
            .ok_or(BatchError::TotalOverflow)?;
        let available = self
            .invoker
            .balance_of(from, None)
            .await
            .map_err(|source| BatchError::BalanceUnavailable {
                sender: from,
                source,
            })?;
        if available < required {
            return Err(BatchError::InsufficientFunds {
                sender: from,
                required,
                available,
            });
        }
        info!(
            required = %to_decimal(required),
            available = %to_decimal(available),
            "Funds cover the plan"
        );
        Ok(())
    }

    async fn pay(
        &self,
        entry: &PayoutEntry,
        from: Address,
        credential: &dyn Credential,
        stop: &watch::Receiver<bool>,
    ) -> PayoutStatus {
        let handle = match self
            .invoker
            .transfer(entry.destination, entry.amount, from, credential)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                error!(destination = %entry.destination, amount = %entry.amount, error = %e, "Payout not submitted");
                return PayoutStatus::SubmitFailed {
                    error: e.to_string(),
                };
            }
        };

        let options = self.confirmer.options();
        let outcome = self
            .confirmer
            .await_with_cancel(
                &handle,
                options.poll_interval(),
                options.max_wait(),
                stop.clone(),
            )
            .await;
        let hash = handle.hash;
        match outcome {
            Ok(TransactionOutcome::Confirmed { block_height, .. }) => {
                info!(destination = %entry.destination, amount = %to_decimal(entry.amount), %hash, "Payout confirmed");
                PayoutStatus::Confirmed { hash, block_height }
            }
            Ok(TransactionOutcome::Reverted { reason }) => {
                error!(destination = %entry.destination, %hash, ?reason, "Payout reverted");
                PayoutStatus::Reverted { hash, reason }
            }
            Ok(TransactionOutcome::Dropped) => {
                error!(destination = %entry.destination, %hash, "Payout dropped");
                PayoutStatus::Dropped { hash }
            }
            Ok(TransactionOutcome::TimedOut) => {
                warn!(destination = %entry.destination, %hash, "Payout unconfirmed, recheck before resubmitting");
                PayoutStatus::TimedOut { hash, error: None }
            }
            Err(e) => {
                warn!(destination = %entry.destination, %hash, error = %e, "Lost track of payout");
                PayoutStatus::TimedOut {
                    hash,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn skipped(reason: &str) -> PayoutStatus {
    PayoutStatus::Skipped {
        reason: reason.to_string(),
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow_and_update() {
            return;
        }
        if stop.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
