//! Error types for PairBridge.
//!
//! All errors use the `PB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Ledger / request intake errors
//! - 2xx: Settlement / asset errors
//! - 3xx: Registry errors
//! - 4xx: Access-control errors
//! - 9xx: General / internal errors
//!
//! Every error aborts the whole operation that raised it; callers observe
//! state exactly as it was before the call.

use thiserror::Error;

use crate::{Address, Amount, ForeignRef, PairName, RequestId, SlotId};

/// Central error enum for all PairBridge operations.
#[derive(Debug, Error)]
pub enum PairbridgeError {
    // =================================================================
    // Ledger Errors (1xx)
    // =================================================================
    /// A request with this foreign reference was already submitted
    /// (pending or completed).
    #[error("PB_ERR_100: Duplicate request for foreign reference {0}")]
    DuplicateRequest(ForeignRef),

    /// The requested amount is zero.
    #[error("PB_ERR_101: Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// The foreign reference is the zero reference.
    #[error("PB_ERR_102: Invalid foreign reference: zero reference")]
    InvalidReference,

    /// The destination is the zero address.
    #[error("PB_ERR_103: Invalid destination: zero address")]
    InvalidDestination,

    /// The ledger reached its configured capacity.
    #[error("PB_ERR_104: Ledger full: {max} requests")]
    LedgerFull { max: usize },

    /// No request exists under this id.
    #[error("PB_ERR_105: Request not found: {0}")]
    RequestNotFound(RequestId),

    // =================================================================
    // Settlement / Asset Errors (2xx)
    // =================================================================
    /// The asset collaborator rejected a transfer.
    #[error("PB_ERR_200: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The sender does not hold enough of the asset.
    #[error("PB_ERR_201: Insufficient asset balance for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        holder: Address,
        needed: Amount,
        available: Amount,
    },

    // =================================================================
    // Registry Errors (3xx)
    // =================================================================
    /// A live registry entry already uses this name.
    #[error("PB_ERR_300: Name already exists: {0}")]
    NameAlreadyExists(PairName),

    /// The candidate slot id is already live.
    #[error("PB_ERR_301: Slot collision at {0}")]
    SlotCollision(SlotId),

    /// The slot id is not live.
    #[error("PB_ERR_302: Slot not found: {0}")]
    NotFound(SlotId),

    /// The position is past the end of the dense index array.
    #[error("PB_ERR_303: Position {position} out of range (count {count})")]
    PositionOutOfRange { position: u64, count: usize },

    /// The pair name is empty or wider than the fixed name width.
    #[error("PB_ERR_304: Invalid name: {reason}")]
    InvalidName { reason: String },

    /// The registry reached its configured capacity.
    #[error("PB_ERR_305: Registry full: {max} entries")]
    RegistryFull { max: usize },

    /// Deploying a new exchange instance failed.
    #[error("PB_ERR_306: Deployment failed: {reason}")]
    DeploymentFailed { reason: String },

    // =================================================================
    // Access-Control Errors (4xx)
    // =================================================================
    /// The caller is not an authorized principal for this operation.
    #[error("PB_ERR_400: Unauthorized caller {caller}")]
    Unauthorized { caller: Address },

    /// Ownership cannot be handed to the zero address.
    #[error("PB_ERR_401: Invalid owner: zero address")]
    InvalidOwner,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("PB_ERR_901: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PairbridgeError>;
