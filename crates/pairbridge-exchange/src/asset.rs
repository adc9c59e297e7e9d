//! Fungible-asset collaborator.
//!
//! The exchange never owns the asset's balances; it moves them through
//! [`FungibleAsset`]. Every batch of transfers runs inside
//! [`FungibleAsset::atomically`], which gives the batch exclusive access
//! and undoes all of its transfers if the batch returns an error.
//!
//! [`TokenLedger`] is the in-memory asset used by the workspace and its
//! tests; [`SharedToken`] lets several exchanges hold the same token.

use std::collections::HashMap;
use std::sync::Arc;

use pairbridge_types::{Address, Amount, PairbridgeError, Result};
use parking_lot::Mutex;

/// Transfer surface visible inside an atomic batch.
pub trait AssetTransfers {
    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()>;

    /// Current balance of `holder`.
    fn balance_of(&self, holder: Address) -> Amount;
}

/// A fungible asset that can run a batch of transfers all-or-nothing.
pub trait FungibleAsset {
    /// Current balance of `holder`.
    fn balance_of(&self, holder: Address) -> Amount;

    /// Run `op` with exclusive access to the asset. If `op` fails, every
    /// transfer it made is rolled back before the error is returned.
    fn atomically<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn AssetTransfers) -> Result<T>;
}

// ---------------------------------------------------------------------------
// TokenLedger
// ---------------------------------------------------------------------------

/// In-memory token: per-holder balances plus the total minted supply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units for `to`.
    ///
    /// # Errors
    /// - `InvalidDestination` if `to` is the zero address
    /// - `Internal` if the supply would overflow 256 bits
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(PairbridgeError::InvalidDestination);
        }
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| PairbridgeError::Internal("token supply overflow".into()))?;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Sum of all balances.
    #[must_use]
    pub fn circulating(&self) -> Amount {
        self.balances
            .values()
            .fold(Amount::zero(), |acc, b| acc.saturating_add(*b))
    }

    /// Check that transfers neither created nor destroyed units.
    ///
    /// # Errors
    /// Returns [`PairbridgeError::Internal`] if circulating != minted.
    pub fn verify_supply(&self) -> Result<()> {
        let circulating = self.circulating();
        if circulating != self.total_supply {
            return Err(PairbridgeError::Internal(format!(
                "supply mismatch: circulating {circulating} != minted {}",
                self.total_supply
            )));
        }
        Ok(())
    }
}

impl AssetTransfers for TokenLedger {
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(PairbridgeError::InvalidDestination);
        }
        let available = self.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(PairbridgeError::InsufficientBalance {
                holder: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    fn balance_of(&self, holder: Address) -> Amount {
        self.balances.get(&holder).copied().unwrap_or_default()
    }
}

impl FungibleAsset for TokenLedger {
    fn balance_of(&self, holder: Address) -> Amount {
        AssetTransfers::balance_of(self, holder)
    }

    fn atomically<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn AssetTransfers) -> Result<T>,
    {
        let checkpoint = self.clone();
        let result = op(&mut *self);
        if result.is_err() {
            *self = checkpoint;
        }
        result
    }
}

// ---------------------------------------------------------------------------
// SharedToken
// ---------------------------------------------------------------------------

/// Cloneable handle to one [`TokenLedger`] shared by many exchanges.
///
/// The token lock is held for the whole of an atomic batch, so a rollback
/// can never undo another exchange's transfers.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<Mutex<TokenLedger>>,
}

impl SharedToken {
    #[must_use]
    pub fn new(ledger: TokenLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn mint(&self, to: Address, amount: Amount) -> Result<()> {
        self.inner.lock().mint(to, amount)
    }

    /// Direct transfer outside any exchange batch (e.g. funding an exchange).
    pub fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<()> {
        self.inner.lock().transfer(from, to, amount)
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.inner.lock().total_supply()
    }

    pub fn verify_supply(&self) -> Result<()> {
        self.inner.lock().verify_supply()
    }
}

impl FungibleAsset for SharedToken {
    fn balance_of(&self, holder: Address) -> Amount {
        AssetTransfers::balance_of(&*self.inner.lock(), holder)
    }

    fn atomically<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn AssetTransfers) -> Result<T>,
    {
        let mut guard = self.inner.lock();
        guard.atomically(op)
    }
}
