//! # Nonce Race
//!
//! Two invokers that do not share a nonce cache submit for the same sender
//! at the same moment. Both pick the same nonce; the node accepts one and
//! refuses the other as "nonce too low". The loser resyncs from the node on
//! its next submission instead of repeating the stale nonce.

#[cfg(test)]
mod tests {
    use crate::support::{coins, funded_node, operator};
    use async_trait::async_trait;
    use gt_03_contract_invoker::{ChainRejection, ContractInvoker, InvokerConfig, InvokerError};
    use gt_rpc_transport::InMemoryTransport;
    use shared_crypto::Credential;
    use shared_types::{
        Address, BlockHeight, CallRequest, Receipt, SignedTransaction, Transport, TransportError,
        TxHash, U256,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Barrier;

    /// Holds the first `gated` broadcasts until all of them have arrived.
    struct GatedTransport {
        inner: Arc<InMemoryTransport>,
        barrier: Barrier,
        gated: usize,
        seen: AtomicUsize,
    }

    impl GatedTransport {
        fn new(inner: Arc<InMemoryTransport>, gated: usize) -> Self {
            Self {
                inner,
                barrier: Barrier::new(gated),
                gated,
                seen: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn read_call(
            &self,
            to: Address,
            data: &[u8],
            at_height: Option<BlockHeight>,
        ) -> Result<Vec<u8>, TransportError> {
            self.inner.read_call(to, data, at_height).await
        }

        async fn read_call_as(
            &self,
            from: Address,
            to: Address,
            data: &[u8],
        ) -> Result<Vec<u8>, TransportError> {
            self.inner.read_call_as(from, to, data).await
        }

        async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash, TransportError> {
            if self.seen.fetch_add(1, Ordering::SeqCst) < self.gated {
                self.barrier.wait().await;
            }
            self.inner.broadcast(tx).await
        }

        async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError> {
            self.inner.receipt(hash).await
        }

        async fn balance_at(
            &self,
            address: Address,
            at_height: Option<BlockHeight>,
        ) -> Result<U256, TransportError> {
            self.inner.balance_at(address, at_height).await
        }

        async fn pending_nonce(&self, address: Address) -> Result<u64, TransportError> {
            self.inner.pending_nonce(address).await
        }

        async fn confirmed_nonce(&self, address: Address) -> Result<u64, TransportError> {
            self.inner.confirmed_nonce(address).await
        }

        async fn gas_price(&self) -> Result<U256, TransportError> {
            self.inner.gas_price().await
        }

        async fn chain_id(&self) -> Result<u64, TransportError> {
            self.inner.chain_id().await
        }

        async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError> {
            self.inner.estimate_gas(request).await
        }

        async fn transaction_known(&self, hash: TxHash) -> Result<bool, TransportError> {
            self.inner.transaction_known(hash).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_losing_invoker_resyncs_after_nonce_conflict() {
        let node = funded_node(coins(100));
        let gate: Arc<dyn Transport> = Arc::new(GatedTransport::new(node.clone(), 2));
        let first = Arc::new(ContractInvoker::new(gate.clone(), InvokerConfig::default()));
        let second = Arc::new(ContractInvoker::new(gate, InvokerConfig::default()));
        let credential = Arc::new(operator());
        let from = credential.address();

        let send = |invoker: Arc<ContractInvoker>, to: u64| {
            let credential = credential.clone();
            tokio::spawn(async move {
                invoker
                    .transfer(Address::from_low_u64(to), coins(1), from, credential.as_ref())
                    .await
            })
        };
        let a = send(first.clone(), 0xa);
        let b = send(second.clone(), 0xb);
        let results = [a.await.unwrap(), b.await.unwrap()];

        let accepted: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let refused: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].nonce, 0);
        assert_eq!(refused.len(), 1);
        assert!(refused[0].is_nonce_conflict());
        assert_eq!(
            refused[0],
            &InvokerError::Rejected(ChainRejection::NonceTooLow {
                sender: from,
                nonce: 0
            })
        );

        // Whichever lost retries and lands on the next nonce.
        let loser = if results[0].is_err() { first } else { second };
        let retry = loser
            .transfer(Address::from_low_u64(0xc), coins(1), from, credential.as_ref())
            .await
            .unwrap();
        assert_eq!(retry.nonce, 1);

        let nonces: Vec<u64> = node.broadcasts().iter().map(|tx| tx.unsigned.nonce).collect();
        assert_eq!(nonces, vec![0, 1]);
        assert_eq!(node.pending_nonce(from).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shared_invoker_serializes_one_sender() {
        let node = funded_node(coins(100));
        let invoker = Arc::new(ContractInvoker::new(node.clone(), InvokerConfig::default()));
        let credential = Arc::new(operator());
        let from = credential.address();

        let tasks: Vec<_> = (1..=8u64)
            .map(|to| {
                let invoker = invoker.clone();
                let credential = credential.clone();
                tokio::spawn(async move {
                    invoker
                        .transfer(Address::from_low_u64(to), coins(1), from, credential.as_ref())
                        .await
                })
            })
            .collect();
        let mut nonces = Vec::new();
        for task in tasks {
            nonces.push(task.await.unwrap().unwrap().nonce);
        }
        nonces.sort_unstable();
        assert_eq!(nonces, (0..8).collect::<Vec<_>>());
        assert_eq!(invoker.stats().submitted, 8);
        assert_eq!(invoker.stats().rejected, 0);
    }
}
