//! # pairbridge-types
//!
//! Shared types, errors, and configuration for the **PairBridge** registry
//! and settlement engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`ForeignRef`], [`RequestId`], [`SlotId`], [`PairName`]
//! - **Amounts**: [`Amount`] (256-bit unsigned)
//! - **Request model**: [`TransferRequest`]
//! - **Event model**: [`Event`], [`EventKind`], [`EventRecord`]
//! - **Configuration**: [`LedgerConfig`], [`RegistryConfig`]
//! - **Errors**: [`PairbridgeError`] with `PB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod request;

// Re-export all primary types at crate root for ergonomic imports:
//   use pairbridge_types::{Address, ForeignRef, TransferRequest, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use request::*;

/// 256-bit unsigned quantity used for request amounts and exchange rates.
pub type Amount = primitive_types::U256;

// Constants are accessed via `pairbridge_types::constants::FOO`
// (not re-exported to avoid name collisions).
