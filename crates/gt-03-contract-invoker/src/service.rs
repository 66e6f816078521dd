//! # Contract Invoker Service
//!
//! One generic entry point for every contract method: `call` for reads
//! (optionally pinned to a height), `submit` for state changes. Plain value
//! transfers and balance lookups ride on the same transport.
//!
//! ## Submission Pipeline
//!
//! ```text
//! encode -> chain id -> gas price -> gas limit -> [lease nonce] -> balance check
//!        -> sign -> broadcast -> [advance | invalidate nonce] -> TransactionHandle
//! ```
//!
//! The nonce lease is held from resolution until the broadcast returns.
//! Nothing is retried here: a refused or failed broadcast is returned to the
//! caller, which decides whether to resubmit.

use crate::config::InvokerConfig;
use crate::domain::envelope::sign_transaction;
use crate::domain::nonce::NonceManager;
use crate::errors::{ChainRejection, InvokerError};

use gt_02_interface_codec::{CallTarget, Decoded, InterfaceCodec, Token};
use parking_lot::Mutex;
use shared_crypto::Credential;
use shared_types::{
    Address, BlockHeight, CallRequest, TransactionHandle, Transport, TransportError,
    UnsignedTransaction, U256,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Counters for one invoker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvokerStats {
    /// Read calls answered.
    pub calls: u64,
    /// Transactions accepted by the node.
    pub submitted: u64,
    /// Submissions refused before or at broadcast.
    pub rejected: u64,
}

/// Executes reads and submits signed transactions over one transport.
///
/// Share it behind an `Arc`: submissions from the same sender are
/// serialized, everything else runs concurrently.
pub struct ContractInvoker {
    transport: Arc<dyn Transport>,
    config: InvokerConfig,
    nonces: NonceManager,
    chain_id: OnceCell<u64>,
    stats: Mutex<InvokerStats>,
}

impl std::fmt::Debug for ContractInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractInvoker")
            .field("config", &self.config)
            .field("chain_id", &self.chain_id.get())
            .finish_non_exhaustive()
    }
}

impl ContractInvoker {
    /// Invoker over `transport`.
    pub fn new(transport: Arc<dyn Transport>, config: InvokerConfig) -> Self {
        Self {
            transport,
            config,
            nonces: NonceManager::new(),
            chain_id: OnceCell::new(),
            stats: Mutex::new(InvokerStats::default()),
        }
    }

    /// The transport this invoker talks to.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Submission settings.
    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> InvokerStats {
        self.stats.lock().clone()
    }

    /// Read-only call of `method` on `target`.
    ///
    /// `at_height = None` reads the latest state.
    #[instrument(skip(self, target, args), fields(contract = %target.address))]
    pub async fn call(
        &self,
        target: &CallTarget,
        method: &str,
        args: &[Token],
        at_height: Option<BlockHeight>,
    ) -> Result<Decoded, InvokerError> {
        let call = InterfaceCodec::encode(&target.interface, method, args)?;
        let raw = self
            .transport
            .read_call(target.address, call.as_bytes(), at_height)
            .await?;
        self.stats.lock().calls += 1;
        debug!(bytes = raw.len(), "Read call answered");
        Ok(InterfaceCodec::decode(&target.interface, method, &raw)?)
    }

    /// Read-only call of `method` simulated as sent by `from`.
    #[instrument(skip_all, fields(contract = %target.address, method = %method, from = %from))]
    pub async fn call_as(
        &self,
        target: &CallTarget,
        method: &str,
        args: &[Token],
        from: Address,
    ) -> Result<Decoded, InvokerError> {
        let call = InterfaceCodec::encode(&target.interface, method, args)?;
        let raw = self
            .transport
            .read_call_as(from, target.address, call.as_bytes())
            .await?;
        self.stats.lock().calls += 1;
        Ok(InterfaceCodec::decode(&target.interface, method, &raw)?)
    }

    /// Sign and broadcast a call of `method` on `target` from `from`.
    ///
    /// Returns as soon as the node accepts the transaction; use a
    /// confirmer to wait for its outcome.
    ///
    /// # Errors
    ///
    /// - `Encoding` for an unknown method or bad arguments
    /// - `Rejected(InsufficientBalance)` if `from` cannot cover value plus gas
    /// - `Rejected(NonceTooLow)` if the nonce was taken; resubmit to resync
    /// - `Rejected(Reverted)` if the node's gas estimate already reverts
    /// - `Transport` for anything the transport could not complete
    #[instrument(
        skip_all,
        fields(contract = %target.address, method = %method, from = %from, value = %value)
    )]
    pub async fn submit(
        &self,
        target: &CallTarget,
        method: &str,
        args: &[Token],
        from: Address,
        credential: &dyn Credential,
        value: U256,
    ) -> Result<TransactionHandle, InvokerError> {
        let call = InterfaceCodec::encode(&target.interface, method, args)?;
        self.send(from, credential, target.address, value, call.into_bytes())
            .await
    }

    /// Sign and broadcast a plain value transfer of `value` to `to`.
    #[instrument(skip_all, fields(to = %to, from = %from, value = %value))]
    pub async fn transfer(
        &self,
        to: Address,
        value: U256,
        from: Address,
        credential: &dyn Credential,
    ) -> Result<TransactionHandle, InvokerError> {
        self.send(from, credential, to, value, Vec::new()).await
    }

    /// Balance of `address`, optionally at a past height.
    pub async fn balance_of(
        &self,
        address: Address,
        at_height: Option<BlockHeight>,
    ) -> Result<U256, InvokerError> {
        Ok(self.transport.balance_at(address, at_height).await?)
    }

    async fn send(
        &self,
        from: Address,
        credential: &dyn Credential,
        to: Address,
        value: U256,
        data: Vec<u8>,
    ) -> Result<TransactionHandle, InvokerError> {
        let signer = credential.address();
        if signer != from {
            return Err(InvokerError::CredentialMismatch {
                expected: from,
                actual: signer,
            });
        }

        let chain_id = self.chain_id().await?;
        let gas_price = match self.config.gas_price {
            Some(price) => price,
            None => self.transport.gas_price().await?,
        };
        let gas_limit = self.gas_limit(from, to, value, &data).await?;

        let mut lease = self.nonces.lease(from).await;
        let nonce = lease.resolve(self.transport.pending_nonce(from).await?);
        let unsigned = UnsignedTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: Some(to),
            value,
            data,
            chain_id,
        };

        let required = unsigned.max_cost().ok_or(InvokerError::CostOverflow)?;
        let available = self.transport.balance_at(from, None).await?;
        if available < required {
            self.stats.lock().rejected += 1;
            return Err(ChainRejection::InsufficientBalance {
                sender: from,
                required,
                available,
            }
            .into());
        }

        let signed = sign_transaction(unsigned, credential)?;
        match self.transport.broadcast(&signed).await {
            Ok(hash) => {
                lease.advance(nonce);
                self.stats.lock().submitted += 1;
                info!(hash = %hash, nonce, gas_limit, "Transaction broadcast");
                Ok(TransactionHandle {
                    hash,
                    sender: from,
                    nonce,
                })
            }
            Err(TransportError::Rejected(message)) => {
                self.stats.lock().rejected += 1;
                let rejection = ChainRejection::from_node(from, nonce, message);
                if matches!(rejection, ChainRejection::NonceTooLow { .. }) {
                    lease.invalidate();
                }
                warn!(nonce, %rejection, "Broadcast refused");
                Err(rejection.into())
            }
            Err(error) => {
                // The node may or may not have the transaction; keep the
                // cached nonce so a resubmission does not replace it.
                warn!(nonce, %error, "Broadcast failed");
                Err(error.into())
            }
        }
    }

    async fn chain_id(&self) -> Result<u64, InvokerError> {
        let id = self
            .chain_id
            .get_or_try_init(|| async {
                match self.config.chain_id {
                    Some(id) => Ok(id),
                    None => self.transport.chain_id().await,
                }
            })
            .await?;
        Ok(*id)
    }

    async fn gas_limit(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: &[u8],
    ) -> Result<u64, InvokerError> {
        if let Some(limit) = self.config.gas_limit {
            return Ok(limit);
        }
        let request = CallRequest {
            from: Some(from),
            to: Some(to),
            value,
            data: data.to_vec(),
        };
        let estimate = self.transport.estimate_gas(&request).await?;
        Ok(self.config.padded(estimate))
    }
}
