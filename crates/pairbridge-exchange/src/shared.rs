//! Serialized handle to an exchange.
//!
//! All callers of one exchange go through a single lock, so operations on
//! the same instance never interleave. The address is cached outside the
//! lock because it never changes.

use std::sync::Arc;

use pairbridge_types::{Address, Amount, ForeignRef, RequestId, Result, TransferRequest};
use parking_lot::{Mutex, MutexGuard};

use crate::asset::FungibleAsset;
use crate::exchange::Exchange;

/// Cloneable, lock-guarded handle to one [`Exchange`].
#[derive(Debug)]
pub struct SharedExchange<A: FungibleAsset> {
    address: Address,
    inner: Arc<Mutex<Exchange<A>>>,
}

impl<A: FungibleAsset> Clone for SharedExchange<A> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: FungibleAsset> SharedExchange<A> {
    #[must_use]
    pub fn new(exchange: Exchange<A>) -> Self {
        Self {
            address: exchange.address(),
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Exclusive access for a sequence of calls that must not interleave
    /// with other callers.
    pub fn lock(&self) -> MutexGuard<'_, Exchange<A>> {
        self.inner.lock()
    }

    pub fn submit(
        &self,
        destination: Address,
        foreign_ref: ForeignRef,
        amount: Amount,
    ) -> Result<RequestId> {
        self.inner.lock().submit(destination, foreign_ref, amount)
    }

    #[must_use]
    pub fn exists(&self, foreign_ref: &ForeignRef) -> bool {
        self.inner.lock().exists(foreign_ref)
    }

    pub fn settle_all(&self, caller: Address) -> Result<bool> {
        self.inner.lock().settle_all(caller)
    }

    pub fn withdraw(&self, caller: Address) -> Result<Amount> {
        self.inner.lock().withdraw(caller)
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        self.inner.lock().transfer_ownership(caller, new_owner)
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.inner.lock().owner()
    }

    /// Copy of one request.
    pub fn request(&self, id: RequestId) -> Result<TransferRequest> {
        self.inner.lock().request(id).cloned()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.inner.lock().request_count()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    /// Whether two handles point at the same exchange instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
