//! System-wide constants for PairBridge.

/// Width in bytes of a pair display name (fixed-width identifier).
pub const PAIR_NAME_WIDTH: usize = 32;

/// Width in bytes of an account / contract address.
pub const ADDRESS_WIDTH: usize = 20;

/// Width in bytes of a foreign transaction reference.
pub const FOREIGN_REF_WIDTH: usize = 32;

/// Default maximum number of requests a single exchange ledger accepts.
///
/// Dedup and settlement both scan the whole ledger, so the cap bounds
/// the cost of every call.
pub const DEFAULT_MAX_REQUESTS: usize = 100_000;

/// Default maximum number of slots the registry hands out.
pub const DEFAULT_MAX_REGISTRY_ENTRIES: usize = 10_000;

/// Domain separator for deterministic contract address derivation.
pub const CONTRACT_ADDRESS_DOMAIN: &[u8] = b"pairbridge:contract_address:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "PairBridge";
