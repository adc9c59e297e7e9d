//! Name-indexed directory of deployed exchanges.
//!
//! Two structures back the registry:
//! - `slots`: slot id → [`SlotState`]. Slot ids are handed out in order and
//!   never reused, so the table is a `Vec` indexed by slot id.
//! - `index`: dense position → slot id, append-only.
//!
//! `remove` zeroes a slot but leaves its id in `index`. That keeps every
//! position stable: [`Registry::count`] includes removed positions and
//! [`Registry::get_by_position`] reads them back as zeroed fields.
//!
//! Every operation validates before it mutates, and no step after the
//! first mutation can fail, so a rejected call leaves the registry as it
//! was.

use pairbridge_exchange::{EventLog, Ownership};
use pairbridge_types::{
    Address, Amount, Event, PairName, PairbridgeError, RegistryConfig, Result, SlotId, constants,
};

use crate::deployer::Deployer;
use crate::slots::{EntryView, RegistryEntry, SlotState};

/// Factory-side registry of exchanges deployed through `D`.
pub struct Registry<D: Deployer> {
    /// Address of the factory contract itself.
    address: Address,
    ownership: Ownership,
    slots: Vec<SlotState<D::Instance>>,
    index: Vec<SlotId>,
    deployer: D,
    events: EventLog,
    max_entries: usize,
}

impl<D: Deployer> std::fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("address", &self.address)
            .field("owner", &self.ownership.current_owner())
            .field("count", &self.index.len())
            .field("live", &self.live_count())
            .finish_non_exhaustive()
    }
}

impl<D: Deployer> Registry<D> {
    #[must_use]
    pub fn new(
        address: Address,
        owner: Address,
        deployer: D,
        events: EventLog,
        config: &RegistryConfig,
    ) -> Self {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            registry = %address,
            owner = %owner,
            max_entries = config.max_entries,
            "Registry created"
        );
        Self {
            address,
            ownership: Ownership::new(owner),
            slots: Vec::new(),
            index: Vec::new(),
            deployer,
            events,
            max_entries: config.max_entries,
        }
    }

    // -----------------------------------------------------------------
    // Liveness
    // -----------------------------------------------------------------

    /// Whether `slot` currently holds a live entry.
    #[must_use]
    pub fn is_live(&self, slot: SlotId) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        self.slot_state(slot).is_some_and(SlotState::is_live)
    }

    fn slot_state(&self, slot: SlotId) -> Option<&SlotState<D::Instance>> {
        usize::try_from(slot.0).ok().and_then(|i| self.slots.get(i))
    }

    fn live_entry(&self, slot: SlotId) -> Result<&RegistryEntry<D::Instance>> {
        self.slot_state(slot)
            .and_then(SlotState::entry)
            .ok_or(PairbridgeError::NotFound(slot))
    }

    fn live_entry_mut(&mut self, slot: SlotId) -> Result<&mut RegistryEntry<D::Instance>> {
        match usize::try_from(slot.0).ok().and_then(|i| self.slots.get_mut(i)) {
            Some(SlotState::Live(entry)) => Ok(entry),
            _ => Err(PairbridgeError::NotFound(slot)),
        }
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Deploy a new exchange named `name` owned by `caller` and index it.
    /// Returns its position.
    ///
    /// # Errors
    /// - `InvalidName` if `name` is empty or too wide
    /// - `NameAlreadyExists` if a live entry uses `name`
    /// - `SlotCollision` if the next slot id is already live
    /// - `RegistryFull` if every slot has been handed out
    /// - `InvalidOwner` if `caller` is the zero address
    /// - any deployer error
    pub fn insert(
        &mut self,
        caller: Address,
        name: &str,
        rate_a: Amount,
        rate_b: Amount,
    ) -> Result<u64> {
        let name = PairName::new(name)?;
        if self.find(&name).is_some() {
            tracing::warn!(registry = %self.address, name = %name, "Insert rejected: name taken");
            return Err(PairbridgeError::NameAlreadyExists(name));
        }
        let slot = SlotId(self.index.len() as u64);
        if self.is_live(slot) {
            return Err(PairbridgeError::SlotCollision(slot));
        }
        if self.index.len() >= self.max_entries {
            return Err(PairbridgeError::RegistryFull {
                max: self.max_entries,
            });
        }
        if caller.is_zero() {
            return Err(PairbridgeError::InvalidOwner);
        }

        let (exchange, instance) = self
            .deployer
            .deploy(self.address, caller, name, rate_a, rate_b)?;

        let position = self.index.len() as u64;
        let entry = SlotState::Live(RegistryEntry {
            slot,
            name,
            address: exchange,
            position,
            instance,
        });
        match usize::try_from(slot.0).ok().and_then(|i| self.slots.get_mut(i)) {
            Some(state) => *state = entry,
            None => self.slots.push(entry),
        }
        self.index.push(slot);

        tracing::info!(
            registry = %self.address,
            slot = %slot,
            position,
            name = %name,
            exchange = %exchange,
            owner = %caller,
            "Exchange registered"
        );
        self.events.emit(
            self.address,
            Event::ExchangeCreated {
                slot,
                position,
                name,
                exchange,
                owner: caller,
            },
        );
        Ok(position)
    }

    /// Zero a live slot. Registry owner only.
    ///
    /// The slot id stays in the dense index array: `count()` is unchanged
    /// and `get_by_position` reads zeroed fields at that position.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` owns the registry
    /// - `NotFound` if `slot` is not live
    pub fn remove(&mut self, caller: Address, slot: SlotId) -> Result<()> {
        self.ownership.ensure_owner(caller)?;
        let exchange = self.live_entry(slot)?.address;

        if let Some(state) = usize::try_from(slot.0).ok().and_then(|i| self.slots.get_mut(i)) {
            *state = SlotState::Empty;
        }

        tracing::info!(registry = %self.address, slot = %slot, exchange = %exchange, "Exchange removed");
        self.events
            .emit(self.address, Event::ExchangeRemoved { slot, exchange });
        Ok(())
    }

    /// Rename a live slot. Open to any caller.
    ///
    /// # Errors
    /// - `InvalidName` if `new_name` is empty or too wide
    /// - `NotFound` if `slot` is not live
    /// - `NameAlreadyExists` if a live entry (this one included) uses
    ///   `new_name`
    pub fn rename(&mut self, slot: SlotId, new_name: &str) -> Result<bool> {
        let new_name = PairName::new(new_name)?;
        self.live_entry(slot)?;
        if self.find(&new_name).is_some() {
            return Err(PairbridgeError::NameAlreadyExists(new_name));
        }

        let entry = self.live_entry_mut(slot)?;
        let old_name = std::mem::replace(&mut entry.name, new_name);

        tracing::info!(
            registry = %self.address,
            slot = %slot,
            old_name = %old_name,
            new_name = %new_name,
            "Exchange renamed"
        );
        self.events.emit(
            self.address,
            Event::ExchangeUpdated {
                slot,
                old_name,
                new_name,
            },
        );
        Ok(true)
    }

    /// Hand registry ownership to `new_owner`. Current owner only.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        let previous_owner = self.ownership.transfer(caller, new_owner)?;
        tracing::info!(
            registry = %self.address,
            previous_owner = %previous_owner,
            new_owner = %new_owner,
            "Registry ownership transferred"
        );
        self.events.emit(
            self.address,
            Event::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Size of the dense index array, removed positions included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.index.len()
    }

    /// Number of live entries.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_live()).count()
    }

    /// Slot id of the first live entry named `name`, scanning positions
    /// in order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<SlotId> {
        let name = PairName::new(name).ok()?;
        self.find(&name)
    }

    fn find(&self, name: &PairName) -> Option<SlotId> {
        self.index.iter().copied().find(|slot| {
            self.slot_state(*slot)
                .and_then(SlotState::entry)
                .is_some_and(|e| e.name == *name)
        })
    }

    /// # Errors
    /// Returns `NotFound` if `slot` is not live.
    pub fn get_by_slot(&self, slot: SlotId) -> Result<EntryView> {
        self.live_entry(slot).map(RegistryEntry::view)
    }

    /// Read the slot at `position` without a liveness check. Removed
    /// slots read back as [`EntryView::zeroed`].
    ///
    /// # Errors
    /// Returns `PositionOutOfRange` if `position >= count()`.
    pub fn get_by_position(&self, position: u64) -> Result<EntryView> {
        let slot = usize::try_from(position)
            .ok()
            .and_then(|i| self.index.get(i))
            .copied()
            .ok_or(PairbridgeError::PositionOutOfRange {
                position,
                count: self.index.len(),
            })?;
        Ok(self
            .slot_state(slot)
            .map_or_else(EntryView::zeroed, SlotState::view))
    }

    /// Handle to the exchange of a live slot.
    ///
    /// # Errors
    /// Returns `NotFound` if `slot` is not live.
    pub fn exchange(&self, slot: SlotId) -> Result<D::Instance> {
        self.live_entry(slot).map(|e| e.instance.clone())
    }

    /// Views of all live entries in position order.
    #[must_use]
    pub fn live_entries(&self) -> Vec<(SlotId, EntryView)> {
        self.index
            .iter()
            .filter_map(|slot| {
                self.slot_state(*slot)
                    .and_then(SlotState::entry)
                    .map(|e| (*slot, e.view()))
            })
            .collect()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.ownership.current_owner()
    }

    #[must_use]
    pub fn deployer(&self) -> &D {
        &self.deployer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairbridge_types::EventKind;

    /// Deployer that hands out numbered addresses. With a `budget` it
    /// refuses every deployment past that many.
    #[derive(Debug, Default)]
    struct CountingDeployer {
        deployed: u64,
        budget: Option<u64>,
    }

    impl Deployer for CountingDeployer {
        type Instance = u64;

        fn deploy(
            &mut self,
            _factory: Address,
            _owner: Address,
            _name: PairName,
            _rate_a: Amount,
            _rate_b: Amount,
        ) -> Result<(Address, u64)> {
            if self.budget.is_some_and(|b| self.deployed >= b) {
                return Err(PairbridgeError::DeploymentFailed {
                    reason: "budget spent".into(),
                });
            }
            self.deployed += 1;
            Ok((Address::from_low_u64(0x1000 + self.deployed), self.deployed))
        }
    }

    const OWNER: u64 = 1;
    const USER: u64 = 2;

    fn addr(v: u64) -> Address {
        Address::from_low_u64(v)
    }

    fn one() -> Amount {
        Amount::one()
    }

    fn registry() -> (Registry<CountingDeployer>, EventLog) {
        let events = EventLog::new();
        let reg = Registry::new(
            addr(0xF),
            addr(OWNER),
            CountingDeployer::default(),
            events.clone(),
            &RegistryConfig::default(),
        );
        (reg, events)
    }

    #[test]
    fn is_live_on_empty_registry() {
        let (reg, _) = registry();
        assert!(!reg.is_live(SlotId(0)));
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn insert_scenario() {
        let (mut reg, _) = registry();
        assert_eq!(reg.insert(addr(USER), "A/B", one(), one()).unwrap(), 0);
        let err = reg
            .insert(addr(USER), "A/B", Amount::from(2u64), Amount::from(2u64))
            .unwrap_err();
        assert!(matches!(err, PairbridgeError::NameAlreadyExists(n) if n.as_str() == "A/B"));
        assert_eq!(reg.insert(addr(USER), "C/D", one(), one()).unwrap(), 1);
        assert_eq!(reg.count(), 2);
        assert_eq!(reg.deployer().deployed, 2);
    }

    #[test]
    fn slot_zero_is_live_after_insert() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        assert!(reg.is_live(SlotId(0)));
        assert!(!reg.is_live(SlotId(1)));
    }

    #[test]
    fn rejected_insert_does_not_deploy() {
        let (mut reg, events) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        let before = events.len();
        assert!(reg.insert(addr(USER), "A/B", one(), one()).is_err());
        assert!(reg.insert(addr(USER), "", one(), one()).is_err());
        assert!(reg.insert(Address::ZERO, "X/Y", one(), one()).is_err());
        assert_eq!(reg.deployer().deployed, 1);
        assert_eq!(reg.count(), 1);
        assert_eq!(events.len(), before);
    }

    #[test]
    fn failed_deployment_changes_nothing() {
        let events = EventLog::new();
        let deployer = CountingDeployer {
            budget: Some(1),
            ..CountingDeployer::default()
        };
        let mut reg = Registry::new(
            addr(0xF),
            addr(OWNER),
            deployer,
            events.clone(),
            &RegistryConfig::default(),
        );
        assert_eq!(reg.insert(addr(USER), "A/B", one(), one()).unwrap(), 0);
        let before = events.len();

        assert!(matches!(
            reg.insert(addr(USER), "C/D", one(), one()),
            Err(PairbridgeError::DeploymentFailed { .. })
        ));
        assert_eq!(reg.count(), 1);
        assert_eq!(reg.deployer().deployed, 1);
        assert_eq!(events.len(), before);
        assert_eq!(reg.find_by_name("C/D"), None);
        assert!(!reg.is_live(SlotId(1)));
    }

    #[test]
    fn insert_emits_one_event() {
        let (mut reg, events) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        let records = events.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event.kind(), EventKind::ExchangeCreated);
    }

    #[test]
    fn remove_keeps_position_and_zeroes_slot() {
        let (mut reg, events) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.insert(addr(USER), "C/D", one(), one()).unwrap();

        reg.remove(addr(OWNER), SlotId(0)).unwrap();
        assert_eq!(reg.count(), 2);
        assert_eq!(reg.live_count(), 1);
        assert!(matches!(
            reg.get_by_slot(SlotId(0)),
            Err(PairbridgeError::NotFound(SlotId(0)))
        ));
        assert!(reg.get_by_position(0).unwrap().is_zeroed());
        assert_eq!(reg.get_by_position(1).unwrap().name.as_str(), "C/D");
        assert_eq!(events.of_kind(EventKind::ExchangeRemoved).len(), 1);
    }

    #[test]
    fn remove_is_owner_only() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        assert!(matches!(
            reg.remove(addr(USER), SlotId(0)),
            Err(PairbridgeError::Unauthorized { .. })
        ));
        assert!(reg.is_live(SlotId(0)));
    }

    #[test]
    fn remove_missing_slot() {
        let (mut reg, _) = registry();
        assert!(matches!(
            reg.remove(addr(OWNER), SlotId(0)),
            Err(PairbridgeError::NotFound(_))
        ));
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.remove(addr(OWNER), SlotId(0)).unwrap();
        assert!(matches!(
            reg.remove(addr(OWNER), SlotId(0)),
            Err(PairbridgeError::NotFound(_))
        ));
    }

    #[test]
    fn removed_slot_id_never_reused() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.insert(addr(USER), "C/D", one(), one()).unwrap();
        reg.remove(addr(OWNER), SlotId(0)).unwrap();

        // Name is free again but lands in a fresh slot at a fresh position.
        assert_eq!(reg.insert(addr(USER), "A/B", one(), one()).unwrap(), 2);
        assert_eq!(reg.find_by_name("A/B"), Some(SlotId(2)));
        assert!(!reg.is_live(SlotId(0)));
    }

    #[test]
    fn rename_updates_and_checks_collisions() {
        let (mut reg, events) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.insert(addr(USER), "C/D", one(), one()).unwrap();

        assert!(reg.rename(SlotId(0), "E/F").unwrap());
        assert_eq!(reg.get_by_slot(SlotId(0)).unwrap().name.as_str(), "E/F");
        assert_eq!(reg.find_by_name("A/B"), None);

        assert!(matches!(
            reg.rename(SlotId(0), "C/D"),
            Err(PairbridgeError::NameAlreadyExists(_))
        ));
        assert!(matches!(
            reg.rename(SlotId(7), "G/H"),
            Err(PairbridgeError::NotFound(_))
        ));
        assert_eq!(events.of_kind(EventKind::ExchangeUpdated).len(), 1);
    }

    #[test]
    fn rename_to_own_name_collides() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        assert!(matches!(
            reg.rename(SlotId(0), "A/B"),
            Err(PairbridgeError::NameAlreadyExists(_))
        ));
    }

    #[test]
    fn find_by_name_skips_removed() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.remove(addr(OWNER), SlotId(0)).unwrap();
        assert_eq!(reg.find_by_name("A/B"), None);
        assert_eq!(reg.find_by_name(""), None);
    }

    #[test]
    fn get_by_position_out_of_range() {
        let (reg, _) = registry();
        assert!(matches!(
            reg.get_by_position(0),
            Err(PairbridgeError::PositionOutOfRange { position: 0, count: 0 })
        ));
    }

    #[test]
    fn positions_share_one_type() {
        let (mut reg, _) = registry();
        let position: u64 = reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        assert_eq!(reg.get_by_position(position).unwrap().index, position);
        assert!(matches!(
            reg.get_by_position(u64::MAX),
            Err(PairbridgeError::PositionOutOfRange { position: u64::MAX, count: 1 })
        ));
    }

    #[test]
    fn registry_full() {
        let events = EventLog::new();
        let cfg = RegistryConfig {
            max_entries: 1,
            ..RegistryConfig::default()
        };
        let mut reg = Registry::new(
            addr(0xF),
            addr(OWNER),
            CountingDeployer::default(),
            events,
            &cfg,
        );
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.remove(addr(OWNER), SlotId(0)).unwrap();
        assert!(matches!(
            reg.insert(addr(USER), "C/D", one(), one()),
            Err(PairbridgeError::RegistryFull { max: 1 })
        ));
    }

    #[test]
    fn exchange_handle_for_live_slot_only() {
        let (mut reg, _) = registry();
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        assert_eq!(reg.exchange(SlotId(0)).unwrap(), 1);
        reg.remove(addr(OWNER), SlotId(0)).unwrap();
        assert!(reg.exchange(SlotId(0)).is_err());
    }

    #[test]
    fn registry_ownership_transfer() {
        let (mut reg, _) = registry();
        reg.transfer_ownership(addr(OWNER), addr(USER)).unwrap();
        assert_eq!(reg.owner(), addr(USER));
        reg.insert(addr(USER), "A/B", one(), one()).unwrap();
        reg.remove(addr(USER), SlotId(0)).unwrap();
    }
}
