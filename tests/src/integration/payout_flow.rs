//! # Payout Flow
//!
//! Ledger files -> summary and reconciliation -> payout plan -> batch run
//! -> report on disk -> rerun of what did not settle.
//!
//! Money is checked at the end: every payable destination holds exactly
//! its ledger total and excluded addresses hold nothing.

#[cfg(test)]
mod tests {
    use crate::support::{coins, funded_node, CHAIN_ID, OPERATOR_KEY};
    use gt_05_ledger::LedgerLayout;
    use gt_06_batch_payout::{PayoutPlan, PayoutStatus};
    use gt_rpc_transport::{InMemoryTransport, ScriptedOutcome};
    use shared_types::{Address, TransportError, U256};
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tokio::sync::watch;
    use toolkit_runtime::commands::{
        dry_run, ledger_summary, load_aggregated, payout, reconcile_files, settled_in,
    };
    use toolkit_runtime::{Toolkit, ToolkitConfig};

    const V1: &str = "0x44b39830a0215a0904137c4474927dcfd049acbb";
    const V2: &str = "0xdc9e2ea9c16c75e22b1aa904d6c94ca70d0c57f3";
    const COMMUNITY: &str = "0x0000000000000000000000000000000000000c0c";
    const W1: &str = "0x0000000000000000000000000000000000000a01";
    const W2: &str = "0x0000000000000000000000000000000000000a02";

    fn address(text: &str) -> Address {
        text.parse().unwrap()
    }

    fn write(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, rows.join("\n")).unwrap();
        path
    }

    struct Ledgers {
        dir: tempfile::TempDir,
        validators: PathBuf,
        voters: PathBuf,
        declared: PathBuf,
    }

    fn ledgers() -> Ledgers {
        let dir = tempfile::tempdir().unwrap();
        let validators = write(
            dir.path(),
            "validators.csv",
            &[
                "address,name,reward".into(),
                format!("{V1},alpha,1000"),
                format!("{V2},\"beta, inc\",2000"),
                format!("{COMMUNITY},fund,500"),
            ],
        );
        let voters = write(
            dir.path(),
            "voters.csv",
            &[
                "epoch,validator,voter,votes,reward".into(),
                format!("1,{V1},{W1},10,300"),
                format!("1,{V1},{W2},10,200"),
                format!("1,{V2},{W1},10,400"),
            ],
        );
        let declared = write(
            dir.path(),
            "validator-voters.csv",
            &[
                "address,name,reward,votes,voter_reward".into(),
                format!("{V1},alpha,1000,20,500"),
                format!("{V2},beta,2000,10,450"),
            ],
        );
        Ledgers {
            dir,
            validators,
            voters,
            declared,
        }
    }

    fn toolkit(node: Arc<InMemoryTransport>) -> Toolkit {
        let mut config = ToolkitConfig::default();
        config.network.chain_id = Some(CHAIN_ID);
        config.signer.private_key = Some(OPERATOR_KEY.into());
        config.batch.pacing_ms = 0;
        Toolkit::with_transport(config, node).unwrap()
    }

    #[test]
    fn test_summary_and_reconciliation() {
        let files = ledgers();
        let excluded: HashSet<Address> = [address(COMMUNITY)].into_iter().collect();

        let summary = ledger_summary(
            std::slice::from_ref(&files.validators),
            &LedgerLayout::VALIDATOR_PAYOUT,
            &excluded,
        )
        .unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.destinations, 2);
        assert_eq!(summary.payable_total, U256::from(3000u64));
        assert_eq!(summary.excluded_records, 1);
        assert_eq!(summary.excluded_total, U256::from(500u64));
        assert_eq!(summary.grand_total, Some(U256::from(3500u64)));

        let found =
            reconcile_files(&files.declared, &files.voters, &LedgerLayout::VOTER_PAYOUT).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address, address(V2));
        assert_eq!(found[0].left, Some(U256::from(450u64)));
        assert_eq!(found[0].right, Some(U256::from(400u64)));
        assert_eq!(found[0].difference(), U256::from(50u64));
    }

    #[tokio::test]
    async fn test_failed_payouts_are_rerun_from_the_report() {
        let files = ledgers();
        let node = funded_node(coins(10));
        let toolkit = toolkit(node.clone());
        let excluded: HashSet<Address> = [address(COMMUNITY)].into_iter().collect();

        let ledger = load_aggregated(
            std::slice::from_ref(&files.validators),
            &LedgerLayout::VALIDATOR_PAYOUT,
            &excluded,
        )
        .unwrap();
        let plan = PayoutPlan::from_ledger(&ledger);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total(), Some(U256::from(3000u64)));

        node.script([
            ScriptedOutcome::Reject(TransportError::Rejected("txpool is full".into())),
            ScriptedOutcome::CONFIRM,
        ]);
        let (_stop_tx, stop) = watch::channel(false);
        let first = payout(&toolkit, &plan, stop.clone()).await.unwrap();
        assert_eq!(first.confirmed(), 1);
        assert_eq!(first.failed(), 1);
        assert!(first.in_doubt().is_empty());
        let failed = first
            .lines
            .iter()
            .find(|line| line.destination == address(V1))
            .unwrap();
        assert!(matches!(
            failed.status,
            PayoutStatus::SubmitFailed { ref error } if error.contains("txpool is full")
        ));
        let paid = first
            .lines
            .iter()
            .find(|line| line.destination == address(V2))
            .unwrap();
        assert_eq!(paid.balance_after, Some(U256::from(2000u64)));

        let report_path = files.dir.path().join("report.json");
        std::fs::write(&report_path, serde_json::to_string_pretty(&first).unwrap()).unwrap();
        let settled = settled_in(&report_path).unwrap();
        assert_eq!(settled, HashSet::from([address(V2)]));

        let rerun_plan = plan.without(&settled);
        assert_eq!(rerun_plan, first.unsettled());
        let second = payout(&toolkit, &rerun_plan, stop).await.unwrap();
        assert_eq!(second.confirmed(), 1);
        assert_eq!(second.failed(), 0);

        assert_eq!(node.balance(address(V1)), U256::from(1000u64));
        assert_eq!(node.balance(address(V2)), U256::from(2000u64));
        assert_eq!(node.balance(address(COMMUNITY)), U256::zero());
        assert_eq!(
            first.confirmed_total() + second.confirmed_total(),
            ledger.total()
        );
    }

    #[tokio::test]
    async fn test_dry_run_leaves_the_node_untouched() {
        let files = ledgers();
        let node = funded_node(coins(10));
        let toolkit = toolkit(node.clone());

        let ledger = load_aggregated(
            std::slice::from_ref(&files.voters),
            &LedgerLayout::VOTER_PAYOUT,
            &HashSet::new(),
        )
        .unwrap();
        let plan = PayoutPlan::from_ledger(&ledger);
        assert_eq!(ledger.get(&address(W1)), Some(U256::from(700u64)));

        let rehearsal = dry_run(&toolkit, &plan).await.unwrap();
        assert_eq!(rehearsal.confirmed(), 2);
        assert_eq!(rehearsal.confirmed_total(), U256::from(900u64));
        assert!(node.broadcasts().is_empty());

        let (_stop_tx, stop) = watch::channel(false);
        let report = payout(&toolkit, &plan, stop).await.unwrap();
        assert_eq!(report.confirmed(), 2);
        assert_eq!(node.balance(address(W1)), U256::from(700u64));
        assert_eq!(node.balance(address(W2)), U256::from(200u64));
        assert_eq!(node.broadcasts().len(), 2);
    }
}
