//! # Transaction Confirmer
//!
//! Drives one handle through `Pending -> {Confirmed, Reverted, Dropped, TimedOut}`.
//!
//! ```text
//! loop:
//!   receipt(hash) ── Some(success) ──> Confirmed
//!          │        └ Some(failure) ──> Reverted(reason)
//!          └ None ── !known(hash) && confirmed_nonce(sender) > nonce ──> Dropped
//!   deadline passed or cancelled ─────> TimedOut
//!   sleep(poll_interval)
//! ```
//!
//! Transport failures while polling are tolerated up to
//! `max_consecutive_errors` in a row; a successful poll resets the count.
//! A poll still in flight at the deadline or on cancel is abandoned.

use crate::domain::outcome::{ConfirmationOptions, TransactionOutcome};
use crate::errors::ConfirmationError;

use shared_types::{TransactionHandle, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Polls the transport until a submitted transaction reaches a verdict.
pub struct TransactionConfirmer {
    transport: Arc<dyn Transport>,
    options: ConfirmationOptions,
}

impl std::fmt::Debug for TransactionConfirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionConfirmer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TransactionConfirmer {
    /// Confirmer over `transport`; `options` drive [`Self::confirm`].
    pub fn new(transport: Arc<dyn Transport>, options: ConfirmationOptions) -> Self {
        Self { transport, options }
    }

    /// Polling policy.
    pub fn options(&self) -> &ConfirmationOptions {
        &self.options
    }

    /// Wait for `handle` using the configured interval and budget.
    pub async fn confirm(
        &self,
        handle: &TransactionHandle,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        self.await_outcome(handle, self.options.poll_interval(), self.options.max_wait())
            .await
    }

    /// Poll `handle` every `poll_interval` for at most `max_wait`.
    pub async fn await_outcome(
        &self,
        handle: &TransactionHandle,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        // The sender half lives for the whole call, so this never fires.
        let (_keep, cancel) = watch::channel(false);
        self.await_with_cancel(handle, poll_interval, max_wait, cancel)
            .await
    }

    /// Like [`Self::await_outcome`], returning `TimedOut` as soon as
    /// `cancel` turns true. Cancelling never touches the chain.
    #[instrument(skip_all, fields(hash = %handle.hash, nonce = handle.nonce))]
    pub async fn await_with_cancel(
        &self,
        handle: &TransactionHandle,
        poll_interval: Duration,
        max_wait: Duration,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        if poll_interval.is_zero() {
            return Err(ConfirmationError::ZeroPollInterval);
        }
        let deadline = Instant::now() + max_wait;
        let mut failures = 0u32;
        let mut polls = 0u64;

        loop {
            if *cancel.borrow() {
                info!("Confirmation cancelled");
                return Ok(TransactionOutcome::TimedOut);
            }

            polls += 1;
            // A poll the node never answers must not outlive the budget.
            let polled = tokio::select! {
                biased;
                () = cancelled(&mut cancel) => {
                    info!("Confirmation cancelled");
                    return Ok(TransactionOutcome::TimedOut);
                }
                result = self.poll(handle) => result,
                () = tokio::time::sleep_until(deadline) => {
                    info!(polls, "No verdict within wait budget");
                    return Ok(TransactionOutcome::TimedOut);
                }
            };
            match polled {
                Ok(Some(outcome)) => {
                    info!(polls, %outcome, "Transaction settled");
                    return Ok(outcome);
                }
                Ok(None) => failures = 0,
                Err(source) => {
                    failures += 1;
                    warn!(failures, error = %source, "Receipt poll failed");
                    if failures > self.options.max_consecutive_errors {
                        return Err(ConfirmationError::Transport {
                            hash: handle.hash,
                            attempts: failures,
                            source,
                        });
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                info!(polls, "No verdict within wait budget");
                return Ok(TransactionOutcome::TimedOut);
            }
            let wake = (now + poll_interval).min(deadline);
            tokio::select! {
                () = tokio::time::sleep_until(wake) => {}
                () = cancelled(&mut cancel) => {
                    info!("Confirmation cancelled");
                    return Ok(TransactionOutcome::TimedOut);
                }
            }
        }
    }

    /// One round: receipt first, then the dropped rule.
    async fn poll(
        &self,
        handle: &TransactionHandle,
    ) -> Result<Option<TransactionOutcome>, TransportError> {
        if let Some(receipt) = self.transport.receipt(handle.hash).await? {
            return Ok(Some(TransactionOutcome::from_receipt(receipt)));
        }
        if self.transport.transaction_known(handle.hash).await? {
            debug!("Still pending");
            return Ok(None);
        }
        let confirmed = self.transport.confirmed_nonce(handle.sender).await?;
        if confirmed > handle.nonce {
            return Ok(Some(TransactionOutcome::Dropped));
        }
        // Not yet propagated to the node we are asking.
        Ok(None)
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Nobody can cancel any more.
            std::future::pending::<()>().await;
        }
    }
}
