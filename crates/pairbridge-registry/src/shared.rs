//! Serialized handle to a registry.

use std::sync::Arc;

use pairbridge_types::{Address, Amount, Result, SlotId};
use parking_lot::{Mutex, MutexGuard};

use crate::deployer::Deployer;
use crate::registry::Registry;
use crate::slots::EntryView;

/// Cloneable, lock-guarded handle to one [`Registry`].
pub struct SharedRegistry<D: Deployer> {
    inner: Arc<Mutex<Registry<D>>>,
}

impl<D: Deployer> Clone for SharedRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Deployer> SharedRegistry<D> {
    #[must_use]
    pub fn new(registry: Registry<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Registry<D>> {
        self.inner.lock()
    }

    pub fn insert(&self, caller: Address, name: &str, rate_a: Amount, rate_b: Amount) -> Result<u64> {
        self.inner.lock().insert(caller, name, rate_a, rate_b)
    }

    pub fn remove(&self, caller: Address, slot: SlotId) -> Result<()> {
        self.inner.lock().remove(caller, slot)
    }

    pub fn rename(&self, slot: SlotId, new_name: &str) -> Result<bool> {
        self.inner.lock().rename(slot, new_name)
    }

    #[must_use]
    pub fn is_live(&self, slot: SlotId) -> bool {
        self.inner.lock().is_live(slot)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.lock().count()
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<SlotId> {
        self.inner.lock().find_by_name(name)
    }

    pub fn get_by_slot(&self, slot: SlotId) -> Result<EntryView> {
        self.inner.lock().get_by_slot(slot)
    }

    pub fn get_by_position(&self, position: u64) -> Result<EntryView> {
        self.inner.lock().get_by_position(position)
    }

    pub fn exchange(&self, slot: SlotId) -> Result<D::Instance> {
        self.inner.lock().exchange(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployer::ExchangeDeployer;
    use pairbridge_exchange::{EventLog, SharedToken};
    use pairbridge_types::{LedgerConfig, PairbridgeError, RegistryConfig};
    use std::thread;

    fn shared() -> SharedRegistry<ExchangeDeployer<SharedToken>> {
        let events = EventLog::new();
        let deployer = ExchangeDeployer::new(
            SharedToken::default(),
            Address::from_low_u64(0x70),
            Address::from_low_u64(2),
            LedgerConfig::default(),
            events.clone(),
        );
        SharedRegistry::new(Registry::new(
            Address::from_low_u64(0xF),
            Address::from_low_u64(1),
            deployer,
            events,
            &RegistryConfig::default(),
        ))
    }

    #[test]
    fn racing_inserts_of_one_name_accept_exactly_one() {
        let reg = shared();
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let reg = reg.clone();
                thread::spawn(move || {
                    reg.insert(
                        Address::from_low_u64(100 + t),
                        "ETH/USDT",
                        Amount::one(),
                        Amount::one(),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(PairbridgeError::NameAlreadyExists(_))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(dup, 7);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn racing_inserts_of_distinct_names_get_distinct_positions() {
        let reg = shared();
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let reg = reg.clone();
                thread::spawn(move || {
                    reg.insert(
                        Address::from_low_u64(100 + t),
                        &format!("P{t}/Q"),
                        Amount::one(),
                        Amount::one(),
                    )
                    .unwrap()
                })
            })
            .collect();

        let mut positions: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..8).collect::<Vec<_>>());
        for t in 0..8u64 {
            assert!(reg.find_by_name(&format!("P{t}/Q")).is_some());
        }
    }
}
