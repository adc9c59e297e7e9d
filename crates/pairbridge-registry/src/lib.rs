//! # pairbridge-registry
//!
//! **Factory registry**: deploys exchanges and indexes them by name.
//!
//! ## Architecture
//!
//! - [`Registry`]: slot table (`slot id → SlotState`) plus a dense
//!   position → slot id array; names are unique among live entries and slot
//!   ids are never reused
//! - [`Deployer`]: deployment collaborator called once per insert;
//!   [`ExchangeDeployer`] builds [`pairbridge_exchange::SharedExchange`]s
//!   at deterministic addresses
//! - [`SharedRegistry`]: serializes concurrent callers behind one lock
//!
//! ## Removal
//!
//! `remove` zeroes the slot but keeps its position: `count()` still counts
//! it and `get_by_position` reads it back as [`EntryView::zeroed`].

pub mod deployer;
pub mod registry;
pub mod shared;
pub mod slots;

pub use deployer::{Deployer, ExchangeDeployer};
pub use registry::Registry;
pub use shared::SharedRegistry;
pub use slots::{EntryView, RegistryEntry, SlotState};
