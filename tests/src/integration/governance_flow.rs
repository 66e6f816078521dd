//! # Governance Flow
//!
//! Catalog interface -> ContractInvoker -> InMemoryTransport -> TransactionConfirmer.
//!
//! 1. Reads resolve through the bundled catalog and the contract registry,
//!    latest and historical.
//! 2. A submitted method call is signed for the node's chain and confirmed.
//! 3. Reverts, stalls and cancellation surface as outcomes, not errors.

#[cfg(test)]
mod tests {
    use crate::support::{coins, funded_node, operator, word, CHAIN_ID};
    use gt_02_interface_codec::{
        selector_of, ContractRegistry, Decoded, InterfaceCatalog, Token, ELECTION,
    };
    use gt_03_contract_invoker::{signing_hash, ChainRejection, ContractInvoker, InvokerConfig, InvokerError};
    use gt_04_tx_confirmation::{ConfirmationOptions, TransactionConfirmer, TransactionOutcome};
    use gt_rpc_transport::ScriptedOutcome;
    use shared_crypto::{recover_address, Credential, RecoverableSignature};
    use shared_types::{Address, U256};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    const ELECTION_ADDRESS: u64 = 0x8d66;

    fn election() -> gt_02_interface_codec::CallTarget {
        let catalog = InterfaceCatalog::bundled().unwrap();
        let registry: ContractRegistry = [(ELECTION.to_string(), Address::from_low_u64(ELECTION_ADDRESS))]
            .into_iter()
            .collect();
        catalog.target(&registry, ELECTION).unwrap()
    }

    fn options() -> ConfirmationOptions {
        ConfirmationOptions {
            poll_interval_ms: 250,
            max_wait_ms: 5_000,
            max_consecutive_errors: 3,
        }
    }

    #[tokio::test]
    async fn test_reads_latest_and_historical_state() {
        let node = funded_node(coins(10));
        let target = election();
        let validator = Address::from_low_u64(0x7a1);
        let votes = selector_of("getActiveVotesForValidator(address)");
        node.stub_call(target.address, votes, word(900));
        node.stub_call_at(target.address, votes, 17_280, word(600));
        node.stub_call(
            target.address,
            selector_of("electableValidators()"),
            [word(1), word(110)].concat(),
        );

        let invoker = ContractInvoker::new(node.clone(), InvokerConfig::default());
        let args = [Token::Address(validator)];
        let now = invoker
            .call(&target, "getActiveVotesForValidator", &args, None)
            .await
            .unwrap();
        let then = invoker
            .call(&target, "getActiveVotesForValidator", &args, Some(17_280))
            .await
            .unwrap();
        assert_eq!(now, Decoded::Single(Token::uint(900u64)));
        assert_eq!(then, Decoded::Single(Token::uint(600u64)));

        let bounds = invoker
            .call(&target, "electableValidators", &[], None)
            .await
            .unwrap()
            .into_tokens();
        assert_eq!(bounds, vec![Token::uint(1u64), Token::uint(110u64)]);

        let calls = node.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].at_height, Some(17_280));
        assert_eq!(&calls[0].data[..4], &votes);
    }

    #[tokio::test]
    async fn test_submit_signs_for_chain_and_confirms() {
        let node = funded_node(coins(10));
        let credential = operator();
        let target = election();
        let invoker = ContractInvoker::new(node.clone(), InvokerConfig::default());
        let confirmer = TransactionConfirmer::new(node.clone(), options());

        let handle = invoker
            .submit(
                &target,
                "setElectableValidators",
                &[Token::uint(2u64), Token::uint(100u64)],
                credential.address(),
                &credential,
                U256::zero(),
            )
            .await
            .unwrap();
        let outcome = confirmer.confirm(&handle).await.unwrap();
        assert!(outcome.is_confirmed());

        let sent = &node.broadcasts()[0];
        assert_eq!(sent.hash, handle.hash);
        assert_eq!(sent.unsigned.chain_id, CHAIN_ID);
        assert_eq!(sent.unsigned.to, Some(target.address));
        assert_eq!(&sent.unsigned.data[..4], &selector_of("setElectableValidators(uint256,uint256)"));

        let recovery_id = u8::try_from(sent.v - 35 - 2 * CHAIN_ID).unwrap();
        let signature = RecoverableSignature {
            r: sent.r,
            s: sent.s,
            recovery_id,
        };
        let signer = recover_address(&signing_hash(&sent.unsigned), &signature).unwrap();
        assert_eq!(signer, credential.address());
        assert_eq!(invoker.stats().submitted, 1);
    }

    #[tokio::test]
    async fn test_reverts_surface_with_reason() {
        let node = funded_node(coins(10));
        let credential = operator();
        let target = election();
        let invoker = ContractInvoker::new(node.clone(), InvokerConfig::default());
        let confirmer = TransactionConfirmer::new(node.clone(), options());

        node.stub_revert(target.address, selector_of("maxNumValidatorsVotedFor()"), "not initialized");
        let err = invoker
            .call(&target, "maxNumValidatorsVotedFor", &[], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InvokerError::Rejected(ChainRejection::Reverted {
                reason: "not initialized".into()
            })
        );

        node.script([ScriptedOutcome::Revert("min above max".into())]);
        let handle = invoker
            .submit(
                &target,
                "setElectableValidators",
                &[Token::uint(200u64), Token::uint(100u64)],
                credential.address(),
                &credential,
                U256::zero(),
            )
            .await
            .unwrap();
        assert_eq!(
            confirmer.confirm(&handle).await.unwrap(),
            TransactionOutcome::Reverted {
                reason: Some("min above max".into())
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_transaction_times_out_or_is_cancelled() {
        let node = funded_node(coins(10));
        let credential = operator();
        let invoker = ContractInvoker::new(node.clone(), InvokerConfig::default());
        let confirmer = Arc::new(TransactionConfirmer::new(node.clone(), options()));
        node.set_default_outcome(ScriptedOutcome::Pending);

        let to = Address::from_low_u64(0xb0b);
        let handle = invoker
            .transfer(to, coins(1), credential.address(), &credential)
            .await
            .unwrap();
        let started = tokio::time::Instant::now();
        assert_eq!(confirmer.confirm(&handle).await.unwrap(), TransactionOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(5_000));

        let (cancel_tx, cancel) = watch::channel(false);
        let waiter = {
            let confirmer = confirmer.clone();
            let handle = handle;
            tokio::spawn(async move {
                confirmer
                    .await_with_cancel(&handle, Duration::from_millis(250), Duration::from_secs(3_600), cancel)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(2)).await;
        let cancelled_at = tokio::time::Instant::now();
        cancel_tx.send(true).unwrap();
        assert_eq!(waiter.await.unwrap().unwrap(), TransactionOutcome::TimedOut);
        assert!(cancelled_at.elapsed() < Duration::from_millis(250));
        assert_eq!(node.balance(to), U256::zero());
    }
}
