//! Command implementations behind the `gov-toolkit` subcommands.
//!
//! Each returns data; printing is left to the binary.

use crate::container::Toolkit;
use anyhow::{bail, Context, Result};
use gt_02_interface_codec::{parse_args, CallTarget, Decoded, Token};
use gt_04_tx_confirmation::TransactionOutcome;
use gt_05_ledger::{
    aggregate, group_by_source, index_unique, load_ledger, reconcile, AggregatedLedger,
    Discrepancy, LedgerLayout, LedgerRecord, LedgerSummary,
};
use gt_06_batch_payout::{PayoutPlan, PayoutReport};
use gt_rpc_transport::InMemoryTransport;
use shared_crypto::{Credential, LocalKeyCredential, Secp256k1KeyPair};
use shared_types::{Address, BlockHeight, TransactionHandle, U256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// A broadcast transaction and, when waited for, its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub handle: TransactionHandle,
    pub outcome: Option<TransactionOutcome>,
}

fn method_args(target: &CallTarget, method: &str, args: &[String]) -> Result<Vec<Token>> {
    let descriptor = target.interface.method(method)?;
    parse_args(descriptor, args).with_context(|| format!("arguments of {}", descriptor.signature()))
}

/// Read `method` of `contract`, optionally at a height or as a sender.
pub async fn call(
    toolkit: &Toolkit,
    contract: &str,
    method: &str,
    args: &[String],
    at_height: Option<BlockHeight>,
    from: Option<Address>,
) -> Result<Decoded> {
    let target = toolkit.target(contract)?;
    let tokens = method_args(&target, method, args)?;
    let decoded = match from {
        Some(from) => {
            if at_height.is_some() {
                bail!("--from and --at-height cannot be combined");
            }
            toolkit.invoker().call_as(&target, method, &tokens, from).await?
        }
        None => toolkit.invoker().call(&target, method, &tokens, at_height).await?,
    };
    Ok(decoded)
}

/// Submit `method` of `contract` signed with the configured key.
pub async fn send(
    toolkit: &Toolkit,
    contract: &str,
    method: &str,
    args: &[String],
    value: U256,
    wait: bool,
) -> Result<Sent> {
    let credential = toolkit.credential()?;
    let target = toolkit.target(contract)?;
    let tokens = method_args(&target, method, args)?;
    let handle = toolkit
        .invoker()
        .submit(&target, method, &tokens, credential.address(), &credential, value)
        .await?;
    finish(toolkit, handle, wait).await
}

/// Transfer `amount` base units to `to` from the configured key.
pub async fn transfer(toolkit: &Toolkit, to: Address, amount: U256, wait: bool) -> Result<Sent> {
    let credential = toolkit.credential()?;
    let handle = toolkit
        .invoker()
        .transfer(to, amount, credential.address(), &credential)
        .await?;
    finish(toolkit, handle, wait).await
}

async fn finish(toolkit: &Toolkit, handle: TransactionHandle, wait: bool) -> Result<Sent> {
    let outcome = if wait {
        Some(toolkit.confirmer().confirm(&handle).await?)
    } else {
        None
    };
    Ok(Sent { handle, outcome })
}

/// Balance of `address`, optionally at a past height.
pub async fn balance(toolkit: &Toolkit, address: Address, at_height: Option<BlockHeight>) -> Result<U256> {
    Ok(toolkit.invoker().balance_of(address, at_height).await?)
}

/// Records of every file, in file order.
pub fn load_records(paths: &[PathBuf], layout: &LedgerLayout) -> Result<Vec<LedgerRecord>> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_ledger(path, layout).with_context(|| format!("ledger {}", path.display()))?);
    }
    Ok(records)
}

/// Aggregate every file into one ledger, keeping `excluded` apart.
pub fn load_aggregated(
    paths: &[PathBuf],
    layout: &LedgerLayout,
    excluded: &HashSet<Address>,
) -> Result<AggregatedLedger> {
    let records = load_records(paths, layout)?;
    Ok(aggregate(&records, excluded)?)
}

/// Summary of one aggregated ledger per file, combined.
pub fn ledger_summary(
    paths: &[PathBuf],
    layout: &LedgerLayout,
    excluded: &HashSet<Address>,
) -> Result<LedgerSummary> {
    let mut combined = LedgerSummary::default();
    for path in paths {
        let ledger = load_aggregated(std::slice::from_ref(path), layout, excluded)?;
        let summary = LedgerSummary::of(&ledger);
        info!(file = %path.display(), records = summary.records, "Ledger summarized");
        combined = combined.combine(&summary);
    }
    Ok(combined)
}

/// Compare each validator's voter total with the sum of its voters' rows.
///
/// The validator file must list every validator once.
pub fn reconcile_files(validators: &Path, voters: &Path, voter_layout: &LedgerLayout) -> Result<Vec<Discrepancy>> {
    let validator_rows = load_ledger(validators, &LedgerLayout::VALIDATOR_VOTER_TOTAL)
        .with_context(|| format!("ledger {}", validators.display()))?;
    let voter_rows =
        load_ledger(voters, voter_layout).with_context(|| format!("ledger {}", voters.display()))?;

    let declared = index_unique(&validator_rows)?;
    let summed = group_by_source(&voter_rows)?;
    Ok(reconcile(&declared, &summed))
}

/// Destinations an earlier report file settled or left in doubt.
///
/// A timed-out transfer may still land, so it is never paid again from
/// here; its hash is logged for a manual recheck.
pub fn settled_in(report: &Path) -> Result<HashSet<Address>> {
    let text = std::fs::read_to_string(report).with_context(|| format!("report {}", report.display()))?;
    let report: PayoutReport =
        serde_json::from_str(&text).with_context(|| format!("report {}", report.display()))?;
    for (destination, hash) in report.in_doubt() {
        warn!(%destination, %hash, "Earlier payout unconfirmed, left out of this run");
    }
    Ok(report.settled_or_in_doubt())
}

/// Pay `plan` from the configured key. Stops early once `stop` turns true.
pub async fn payout(toolkit: &Toolkit, plan: &PayoutPlan, stop: watch::Receiver<bool>) -> Result<PayoutReport> {
    let credential = toolkit.credential()?;
    run_plan(toolkit, plan, &credential, stop).await
}

/// Rehearse `plan` against a simulated node that confirms every transfer.
///
/// Nothing leaves the process. The configured key is used when present,
/// otherwise a throwaway one.
pub async fn dry_run(toolkit: &Toolkit, plan: &PayoutPlan) -> Result<PayoutReport> {
    let credential = match toolkit.credential() {
        Ok(credential) => credential,
        Err(_) => LocalKeyCredential::new(Secp256k1KeyPair::generate()),
    };

    let node = Arc::new(InMemoryTransport::new(
        toolkit.config().network.chain_id.unwrap_or(1),
    ));
    node.set_balance(credential.address(), U256::MAX / U256::from(2u8));

    let mut config = toolkit.config().clone();
    config.batch.pacing_ms = 0;
    let rehearsal = Toolkit::with_transport(config, node)?;

    let (_keep, stop) = watch::channel(false);
    run_plan(&rehearsal, plan, &credential, stop).await
}

async fn run_plan(
    toolkit: &Toolkit,
    plan: &PayoutPlan,
    credential: &LocalKeyCredential,
    stop: watch::Receiver<bool>,
) -> Result<PayoutReport> {
    let report = toolkit
        .batch_driver()
        .run_until(plan, credential.address(), credential, stop)
        .await?;
    Ok(report)
}
