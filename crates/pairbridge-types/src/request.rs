//! Transfer request model.
//!
//! A request is created once by `submit`, flipped to completed once by
//! settlement, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ForeignRef, RequestId};

/// A queued instruction to pay `amount` of the exchange's asset to
/// `destination`, justified by `foreign_ref` on the other chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Sequence index inside the ledger. Immutable.
    pub id: RequestId,
    /// Recipient of the transfer.
    pub destination: Address,
    /// Foreign transaction reference (dedup key).
    pub foreign_ref: ForeignRef,
    /// Amount to transfer. Always non-zero.
    pub amount: Amount,
    /// Whether settlement has paid this request.
    pub completed: bool,
    /// When the request entered the ledger.
    pub submitted_at: DateTime<Utc>,
}

impl TransferRequest {
    #[must_use]
    pub fn new(id: RequestId, destination: Address, foreign_ref: ForeignRef, amount: Amount) -> Self {
        Self {
            id,
            destination,
            foreign_ref,
            amount,
            completed: false,
            submitted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}
