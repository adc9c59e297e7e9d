//! # pairbridge-exchange
//!
//! **Exchange contract**: request intake, batch settlement, withdrawals.
//!
//! ## Architecture
//!
//! An [`Exchange`] owns:
//! 1. a [`RequestLedger`]: append-only, densely indexed transfer requests
//!    deduplicated by foreign transaction reference
//! 2. an [`Authority`]: owner + token-owner operator predicate
//! 3. a handle to a [`FungibleAsset`] it pays out of
//! 4. a handle to the shared [`EventLog`]
//!
//! ## Request Flow
//!
//! ```text
//! submit() → RequestLedger (pending)
//!          → settle_all() → Settler pass inside FungibleAsset::atomically
//!          → TransferExecuted events committed
//! ```
//!
//! Every public operation is all-or-nothing; [`SharedExchange`] serializes
//! concurrent callers of one instance behind a single lock.

pub mod access;
pub mod asset;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod settlement;
pub mod shared;

pub use access::{Authority, Ownership};
pub use asset::{AssetTransfers, FungibleAsset, SharedToken, TokenLedger};
pub use events::EventLog;
pub use exchange::{Exchange, ExchangeParams};
pub use ledger::RequestLedger;
pub use settlement::{PaidRequest, SettlementPass, Settler};
pub use shared::SharedExchange;
