//! # Interface Catalog
//!
//! Logical contract name -> parsed interface. Descriptions are parsed once
//! and shared behind `Arc` for the life of the process.

use super::json::parse_interface;
use crate::domain::interface::InterfaceDescription;
use crate::domain::target::{CallTarget, ContractRegistry};
use crate::errors::CodecError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Catalog name of the governance interface.
pub const GOVERNANCE: &str = "governance";
/// Catalog name of the election interface.
pub const ELECTION: &str = "election";
/// Catalog name of the validators interface.
pub const VALIDATORS: &str = "validators";
/// Catalog name of the locked-gold interface.
pub const LOCKED_GOLD: &str = "locked_gold";
/// Catalog name of the epoch-rewards interface.
pub const EPOCH_REWARDS: &str = "epoch_rewards";
/// Catalog name of the blockchain-parameters interface.
pub const BLOCKCHAIN_PARAMETERS: &str = "blockchain_parameters";
/// Catalog name of the upgradeable-proxy interface.
pub const PROXY: &str = "proxy";

const BUNDLED: [(&str, &str); 7] = [
    (GOVERNANCE, include_str!("../../catalog/governance.json")),
    (ELECTION, include_str!("../../catalog/election.json")),
    (VALIDATORS, include_str!("../../catalog/validators.json")),
    (LOCKED_GOLD, include_str!("../../catalog/locked_gold.json")),
    (EPOCH_REWARDS, include_str!("../../catalog/epoch_rewards.json")),
    (
        BLOCKCHAIN_PARAMETERS,
        include_str!("../../catalog/blockchain_parameters.json"),
    ),
    (PROXY, include_str!("../../catalog/proxy.json")),
];

/// Read-only set of interface descriptions keyed by contract name.
#[derive(Debug, Clone, Default)]
pub struct InterfaceCatalog {
    interfaces: BTreeMap<String, Arc<InterfaceDescription>>,
}

impl InterfaceCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the interfaces shipped with the toolkit.
    pub fn bundled() -> Result<Self, CodecError> {
        let mut catalog = Self::new();
        for (name, document) in BUNDLED {
            catalog.insert_json(name, document)?;
        }
        Ok(catalog)
    }

    /// Add (or replace) an interface.
    pub fn insert(&mut self, name: impl Into<String>, description: InterfaceDescription) {
        self.interfaces.insert(name.into(), Arc::new(description));
    }

    /// Parse and add a JSON interface document.
    pub fn insert_json(&mut self, name: &str, document: &str) -> Result<(), CodecError> {
        let description = parse_interface(document).map_err(|e| match e {
            CodecError::InvalidDescription(reason) => {
                CodecError::InvalidDescription(format!("{name}: {reason}"))
            }
            other => other,
        })?;
        debug!(interface = name, methods = description.len(), "Interface loaded");
        self.insert(name, description);
        Ok(())
    }

    /// Load every `*.json` file in `dir`, keyed by file stem.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CodecError> {
        let io_err = |e: std::io::Error| CodecError::InvalidDescription(format!("{}: {e}", dir.display()));
        let mut loaded = 0;
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let document = std::fs::read_to_string(&path).map_err(io_err)?;
            self.insert_json(name, &document)?;
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Interface registered as `name`.
    pub fn get(&self, name: &str) -> Result<Arc<InterfaceDescription>, CodecError> {
        self.interfaces
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::UnknownContract(name.to_string()))
    }

    /// Catalog names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    /// Resolve `name` to a call target using its registered address.
    pub fn target(&self, registry: &ContractRegistry, name: &str) -> Result<CallTarget, CodecError> {
        Ok(CallTarget::new(self.get(name)?, registry.address_of(name)?))
    }
}
