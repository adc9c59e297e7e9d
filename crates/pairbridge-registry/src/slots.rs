//! Slot table entries.
//!
//! A registry slot is either [`SlotState::Live`] or [`SlotState::Empty`].
//! Liveness is the tag itself; a removed slot keeps its id forever and
//! reads back as zeroed fields through positional lookup.

use pairbridge_types::{Address, PairName, SlotId};
use serde::{Deserialize, Serialize};

/// A live directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry<I> {
    pub slot: SlotId,
    pub name: PairName,
    /// Address of the deployed exchange.
    pub address: Address,
    /// Position of `slot` in the dense index array.
    pub position: u64,
    /// Handle to the deployed exchange.
    pub instance: I,
}

impl<I> RegistryEntry<I> {
    #[must_use]
    pub fn view(&self) -> EntryView {
        EntryView {
            name: self.name,
            address: self.address,
            index: self.position,
        }
    }
}

/// State of one slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState<I> {
    /// Never live, or zeroed by `remove`.
    Empty,
    Live(RegistryEntry<I>),
}

impl<I> SlotState<I> {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    #[must_use]
    pub fn entry(&self) -> Option<&RegistryEntry<I>> {
        match self {
            Self::Live(entry) => Some(entry),
            Self::Empty => None,
        }
    }

    /// Public view; zeroed for an empty slot.
    #[must_use]
    pub fn view(&self) -> EntryView {
        self.entry().map_or_else(EntryView::zeroed, RegistryEntry::view)
    }
}

/// `(name, address, index)` triple returned by registry lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    #[serde(with = "pairbridge_types::pair_name_or_empty")]
    pub name: PairName,
    pub address: Address,
    pub index: u64,
}

impl EntryView {
    /// The all-zero view read back from a removed slot.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            name: PairName::EMPTY,
            address: Address::ZERO,
            index: 0,
        }
    }

    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }
}
