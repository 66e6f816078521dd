//! # Call Targets
//!
//! A [`CallTarget`] pairs an interface with the address it is deployed at.
//! The [`ContractRegistry`] maps logical contract names (`"governance"`,
//! `"election"`, ...) to deployed proxy addresses.

use super::interface::InterfaceDescription;
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Interface + deployed address. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CallTarget {
    /// Interface the contract implements.
    pub interface: Arc<InterfaceDescription>,
    /// Deployed address.
    pub address: Address,
}

impl CallTarget {
    /// Pair an interface with an address.
    pub fn new(interface: Arc<InterfaceDescription>, address: Address) -> Self {
        Self { interface, address }
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// Logical contract name -> deployed address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRegistry {
    addresses: BTreeMap<String, Address>,
}

impl ContractRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the address of `name`.
    pub fn register(&mut self, name: impl Into<String>, address: Address) {
        self.addresses.insert(name.into(), address);
    }

    /// Address registered for `name`.
    pub fn address_of(&self, name: &str) -> Result<Address, CodecError> {
        self.addresses
            .get(name)
            .copied()
            .ok_or_else(|| CodecError::UnknownContract(name.to_string()))
    }

    /// Registered names and addresses in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.addresses.iter().map(|(name, address)| (name.as_str(), *address))
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl FromIterator<(String, Address)> for ContractRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Address)>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}
