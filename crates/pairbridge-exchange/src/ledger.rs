//! Request ledger: the append-only queue of transfer requests of one
//! exchange.
//!
//! Requests are stored densely by sequence index and never removed, so
//! the index of a request is stable for the life of the exchange. The
//! foreign reference of every request (pending or completed) is reserved
//! forever.

use pairbridge_types::{
    Address, Amount, ForeignRef, LedgerConfig, PairbridgeError, RequestId, Result,
    TransferRequest, constants,
};
use serde::{Deserialize, Serialize};

/// Ordered store of [`TransferRequest`]s addressed by [`RequestId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLedger {
    /// Requests in submission order; `requests[i].id == RequestId(i)`.
    requests: Vec<TransferRequest>,
    /// Maximum number of requests before the ledger is full.
    max_requests: usize,
}

impl RequestLedger {
    /// Create a new empty ledger with the default max size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            max_requests: constants::DEFAULT_MAX_REQUESTS,
        }
    }

    #[must_use]
    pub fn with_config(config: &LedgerConfig) -> Self {
        Self {
            requests: Vec::new(),
            max_requests: config.max_requests,
        }
    }

    /// Append a new pending request and return its id.
    ///
    /// # Errors
    /// - `DuplicateRequest` if `foreign_ref` was ever submitted before
    /// - `InvalidAmount` if `amount` is zero
    /// - `InvalidReference` if `foreign_ref` is the zero reference
    /// - `InvalidDestination` if `destination` is the zero address
    /// - `LedgerFull` if the ledger is at capacity
    pub fn submit(
        &mut self,
        destination: Address,
        foreign_ref: ForeignRef,
        amount: Amount,
    ) -> Result<RequestId> {
        if self.exists(&foreign_ref) {
            return Err(PairbridgeError::DuplicateRequest(foreign_ref));
        }
        if amount.is_zero() {
            return Err(PairbridgeError::InvalidAmount);
        }
        if foreign_ref.is_zero() {
            return Err(PairbridgeError::InvalidReference);
        }
        if destination.is_zero() {
            return Err(PairbridgeError::InvalidDestination);
        }
        if self.requests.len() >= self.max_requests {
            return Err(PairbridgeError::LedgerFull {
                max: self.max_requests,
            });
        }

        let id = RequestId(self.requests.len() as u64);
        self.requests
            .push(TransferRequest::new(id, destination, foreign_ref, amount));
        Ok(id)
    }

    /// Whether any request, pending or completed, carries `foreign_ref`.
    #[must_use]
    pub fn exists(&self, foreign_ref: &ForeignRef) -> bool {
        if self.requests.is_empty() {
            return false;
        }
        self.requests.iter().any(|r| r.foreign_ref == *foreign_ref)
    }

    #[must_use]
    pub fn get(&self, id: RequestId) -> Option<&TransferRequest> {
        usize::try_from(id.0).ok().and_then(|i| self.requests.get(i))
    }

    /// Flip a pending request to completed. Returns `false` if it was
    /// already completed.
    pub(crate) fn mark_completed(&mut self, id: RequestId) -> Result<bool> {
        let request = usize::try_from(id.0)
            .ok()
            .and_then(|i| self.requests.get_mut(i))
            .ok_or(PairbridgeError::RequestNotFound(id))?;
        if request.completed {
            return Ok(false);
        }
        request.completed = true;
        Ok(true)
    }

    /// Requests in index order.
    pub fn iter(&self) -> impl Iterator<Item = &TransferRequest> {
        self.requests.iter()
    }

    /// Number of requests ever submitted (the request counter).
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Number of requests still waiting for settlement.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests.iter().filter(|r| r.is_pending()).count()
    }

    /// Sum of all pending amounts, saturating at the 256-bit maximum.
    #[must_use]
    pub fn pending_total(&self) -> Amount {
        self.requests
            .iter()
            .filter(|r| r.is_pending())
            .fold(Amount::zero(), |acc, r| acc.saturating_add(r.amount))
    }
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new()
    }
}
