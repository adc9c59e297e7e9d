//! Event types for the PairBridge audit log.
//!
//! Every committed state mutation produces one [`Event`], wrapped in an
//! [`EventRecord`] that carries the emitting contract, a log-wide sequence
//! number, and a timestamp. Events of an aborted operation are never
//! recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ForeignRef, PairName, RequestId, SlotId};

/// Structured payload of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A request entered an exchange ledger.
    RequestSubmitted {
        /// Ledger size after the insert.
        count: u64,
        id: RequestId,
        foreign_ref: ForeignRef,
        amount: Amount,
    },
    /// Settlement paid a pending request.
    TransferExecuted {
        id: RequestId,
        destination: Address,
        amount: Amount,
    },
    /// The exchange's asset balance was swept to an operator.
    Withdrawn { to: Address, amount: Amount },
    /// A contract changed hands.
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    /// The registry deployed and indexed a new exchange.
    ExchangeCreated {
        slot: SlotId,
        position: u64,
        name: PairName,
        exchange: Address,
        owner: Address,
    },
    /// The registry zeroed a slot.
    ExchangeRemoved { slot: SlotId, exchange: Address },
    /// The registry renamed a live slot.
    ExchangeUpdated {
        slot: SlotId,
        old_name: PairName,
        new_name: PairName,
    },
}

/// Discriminant of an [`Event`], for filtering the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RequestSubmitted,
    TransferExecuted,
    Withdrawn,
    OwnershipTransferred,
    ExchangeCreated,
    ExchangeRemoved,
    ExchangeUpdated,
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RequestSubmitted { .. } => EventKind::RequestSubmitted,
            Self::TransferExecuted { .. } => EventKind::TransferExecuted,
            Self::Withdrawn { .. } => EventKind::Withdrawn,
            Self::OwnershipTransferred { .. } => EventKind::OwnershipTransferred,
            Self::ExchangeCreated { .. } => EventKind::ExchangeCreated,
            Self::ExchangeRemoved { .. } => EventKind::ExchangeRemoved,
            Self::ExchangeUpdated { .. } => EventKind::ExchangeUpdated,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestSubmitted => write!(f, "REQUEST_SUBMITTED"),
            Self::TransferExecuted => write!(f, "TRANSFER_EXECUTED"),
            Self::Withdrawn => write!(f, "WITHDRAWN"),
            Self::OwnershipTransferred => write!(f, "OWNERSHIP_TRANSFERRED"),
            Self::ExchangeCreated => write!(f, "EXCHANGE_CREATED"),
            Self::ExchangeRemoved => write!(f, "EXCHANGE_REMOVED"),
            Self::ExchangeUpdated => write!(f, "EXCHANGE_UPDATED"),
        }
    }
}

/// An event as stored in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at zero.
    pub sequence: u64,
    /// Contract that emitted the event.
    pub emitter: Address,
    pub event: Event,
    pub emitted_at: DateTime<Utc>,
}
