//! # Toolkit
//!
//! Holds one transport and the services built on it. Everything is behind
//! `Arc`, so commands can run concurrently against one `Toolkit`.
//!
//! ```text
//! ToolkitConfig ──> Transport ──┬──> ContractInvoker ──┐
//!                               └──> TransactionConfirmer ──> BatchPayoutDriver
//! InterfaceCatalog + ContractRegistry ──> CallTarget
//! ```

use super::config::{ConfigError, ToolkitConfig};
use gt_02_interface_codec::{CallTarget, CodecError, InterfaceCatalog};
use gt_03_contract_invoker::ContractInvoker;
use gt_04_tx_confirmation::TransactionConfirmer;
use gt_06_batch_payout::BatchPayoutDriver;
use gt_rpc_transport::JsonRpcTransport;
use shared_crypto::LocalKeyCredential;
use shared_types::{Transport, TransportError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Configured services over one transport.
pub struct Toolkit {
    config: ToolkitConfig,
    catalog: InterfaceCatalog,
    transport: Arc<dyn Transport>,
    invoker: Arc<ContractInvoker>,
    confirmer: Arc<TransactionConfirmer>,
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("config", &self.config)
            .field("invoker", &self.invoker)
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    /// Toolkit over a JSON-RPC connection to `network.rpc_url`.
    pub fn connect(config: ToolkitConfig) -> Result<Self, ToolkitError> {
        let transport =
            JsonRpcTransport::new(config.network.rpc_url.clone(), config.network.request_timeout_ms)?;
        info!(rpc_url = %config.network.rpc_url, "Using JSON-RPC transport");
        Self::with_transport(config, Arc::new(transport))
    }

    /// Toolkit over any transport.
    pub fn with_transport(
        config: ToolkitConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ToolkitError> {
        let mut catalog = InterfaceCatalog::bundled()?;
        if let Some(dir) = &config.interface_dir {
            let loaded = catalog.load_dir(dir)?;
            info!(dir = %dir.display(), loaded, "Loaded extra interfaces");
        }

        let invoker = Arc::new(ContractInvoker::new(
            transport.clone(),
            config.invoker_config(),
        ));
        let confirmer = Arc::new(TransactionConfirmer::new(
            transport.clone(),
            config.confirmation.clone(),
        ));

        Ok(Self {
            config,
            catalog,
            transport,
            invoker,
            confirmer,
        })
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn catalog(&self) -> &InterfaceCatalog {
        &self.catalog
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn invoker(&self) -> &Arc<ContractInvoker> {
        &self.invoker
    }

    pub fn confirmer(&self) -> &Arc<TransactionConfirmer> {
        &self.confirmer
    }

    /// Contract `name` at its configured address.
    pub fn target(&self, name: &str) -> Result<CallTarget, CodecError> {
        self.catalog.target(&self.config.contracts, name)
    }

    /// Batch driver sharing this toolkit's invoker and confirmer.
    pub fn batch_driver(&self) -> BatchPayoutDriver {
        BatchPayoutDriver::new(
            self.invoker.clone(),
            self.confirmer.clone(),
            self.config.batch.clone(),
        )
    }

    /// Signing credential from `signer.private_key`.
    pub fn credential(&self) -> Result<LocalKeyCredential, ConfigError> {
        let key = self
            .config
            .signer
            .private_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential)?;
        LocalKeyCredential::from_hex(key.trim())
            .map_err(|e| ConfigError::InvalidCredential(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_rpc_transport::InMemoryTransport;
    use shared_crypto::Credential;
    use shared_types::Address;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn toolkit(config: ToolkitConfig) -> Toolkit {
        Toolkit::with_transport(config, Arc::new(InMemoryTransport::default())).unwrap()
    }

    #[test]
    fn test_targets_need_a_registered_address() {
        let mut config = ToolkitConfig::default();
        let unregistered = toolkit(config.clone());
        assert!(matches!(
            unregistered.target("election"),
            Err(CodecError::UnknownContract(_))
        ));

        config
            .contracts
            .register("election", Address::from_low_u64(0xe1));
        let registered = toolkit(config);
        let target = registered.target("election").unwrap();
        assert_eq!(target.address, Address::from_low_u64(0xe1));
        assert!(target.interface.contains("getActiveVotesForValidator"));
    }

    #[test]
    fn test_credential_from_config() {
        let mut config = ToolkitConfig::default();
        assert_eq!(
            toolkit(config.clone()).credential().unwrap_err(),
            ConfigError::MissingCredential
        );

        config.signer.private_key = Some("0xnothex".into());
        assert!(matches!(
            toolkit(config.clone()).credential(),
            Err(ConfigError::InvalidCredential(_))
        ));

        config.signer.private_key = Some(format!(" {KEY}\n"));
        let expected = LocalKeyCredential::from_hex(KEY).unwrap().address();
        assert_eq!(toolkit(config).credential().unwrap().address(), expected);
    }

    #[test]
    fn test_extra_interfaces_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("registry.json"),
            r#"{"getAddressFor": {"inputs": [["id", "bytes32"]], "outputs": [["", "address"]]}}"#,
        )
        .unwrap();
        let config = ToolkitConfig {
            interface_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let toolkit = toolkit(config);
        assert!(toolkit.catalog().get("registry").is_ok());
        assert!(toolkit.catalog().get("governance").is_ok());
    }
}
