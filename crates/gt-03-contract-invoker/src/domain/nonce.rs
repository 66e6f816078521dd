//! # Per-Sender Nonce Serialization
//!
//! The next nonce of a sender is the only mutable state shared by
//! submissions. Each sender gets its own async lock; a submission holds the
//! sender's [`NonceLease`] from nonce resolution until the broadcast
//! returns, so two submissions from one sender through one
//! [`NonceManager`] can never pick the same nonce. Different senders never
//! wait on each other.

use parking_lot::Mutex;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct NonceSlot {
    /// Nonce after the last broadcast this process made, if still trusted.
    next: Option<u64>,
}

/// Hands out exclusive per-sender nonce leases.
#[derive(Debug, Default)]
pub struct NonceManager {
    slots: Mutex<HashMap<Address, Arc<AsyncMutex<NonceSlot>>>>,
}

impl NonceManager {
    /// Empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `sender`'s nonce.
    pub async fn lease(&self, sender: Address) -> NonceLease {
        let slot = Arc::clone(self.slots.lock().entry(sender).or_default());
        NonceLease {
            sender,
            guard: slot.lock_owned().await,
        }
    }

    /// Cached next nonce of `sender`, without waiting for a lease.
    pub fn cached(&self, sender: &Address) -> Option<u64> {
        let slot = self.slots.lock().get(sender).cloned()?;
        let guard = slot.try_lock().ok()?;
        guard.next
    }
}

/// Exclusive hold on one sender's nonce; released on drop.
#[derive(Debug)]
pub struct NonceLease {
    sender: Address,
    guard: OwnedMutexGuard<NonceSlot>,
}

impl NonceLease {
    /// Sender this lease belongs to.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Nonce to use given the node's pending transaction count.
    ///
    /// A node can lag behind our own broadcasts, so the higher of the
    /// cached value and `pending` wins.
    pub fn resolve(&self, pending: u64) -> u64 {
        self.guard.next.map_or(pending, |cached| cached.max(pending))
    }

    /// Record that `nonce` was accepted by the node.
    pub fn advance(&mut self, nonce: u64) {
        self.guard.next = Some(nonce + 1);
    }

    /// Forget the cached nonce; the next lease trusts the node again.
    pub fn invalidate(&mut self) {
        self.guard.next = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_prefers_higher() {
        let manager = NonceManager::new();
        let sender = Address::from_low_u64(1);

        let mut lease = manager.lease(sender).await;
        assert_eq!(lease.resolve(4), 4);
        lease.advance(4);
        assert_eq!(lease.resolve(3), 5);
        assert_eq!(lease.resolve(9), 9);
        drop(lease);

        assert_eq!(manager.cached(&sender), Some(5));
    }

    #[tokio::test]
    async fn test_invalidate_falls_back_to_node() {
        let manager = NonceManager::new();
        let sender = Address::from_low_u64(1);
        let mut lease = manager.lease(sender).await;
        lease.advance(10);
        lease.invalidate();
        assert_eq!(lease.resolve(2), 2);
    }

    #[tokio::test]
    async fn test_same_sender_waits() {
        let manager = Arc::new(NonceManager::new());
        let sender = Address::from_low_u64(1);
        let held = manager.lease(sender).await;

        let contender = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.lease(sender).await.resolve(0) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(held);
        assert_eq!(contender.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_other_senders_do_not_wait() {
        let manager = NonceManager::new();
        let _held = manager.lease(Address::from_low_u64(1)).await;
        let other = tokio::time::timeout(
            Duration::from_millis(100),
            manager.lease(Address::from_low_u64(2)),
        )
        .await;
        assert!(other.is_ok());
    }
}
