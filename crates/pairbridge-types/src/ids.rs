//! Identifiers used throughout PairBridge.
//!
//! Addresses and foreign references are fixed-width byte strings rendered
//! as `0x`-prefixed hex. Ledger and registry positions are plain counters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PairbridgeError, Result, constants};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Identity of an account or deployed contract (20 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; constants::ADDRESS_WIDTH]);

impl Address {
    /// The zero address. Never a valid owner, destination, or instance.
    pub const ZERO: Self = Self([0u8; constants::ADDRESS_WIDTH]);

    /// Address whose last eight bytes hold `value` big-endian.
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; constants::ADDRESS_WIDTH];
        bytes[constants::ADDRESS_WIDTH - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Deterministic contract address from the deployer and its nonce.
    ///
    /// The same deployer and nonce always yield the same address; the
    /// address is the tail of `SHA-256(domain || deployer || nonce)`.
    #[must_use]
    pub fn derive_contract(deployer: Address, nonce: u64) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(constants::CONTRACT_ADDRESS_DOMAIN);
        hasher.update(deployer.0);
        hasher.update(nonce.to_be_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; constants::ADDRESS_WIDTH];
        bytes.copy_from_slice(&hash[hash.len() - constants::ADDRESS_WIDTH..]);
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// ForeignRef
// ---------------------------------------------------------------------------

/// Reference to the transaction on the foreign side of the bridge that
/// justifies a transfer request. Used as the ledger's dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct ForeignRef(pub [u8; constants::FOREIGN_REF_WIDTH]);

impl ForeignRef {
    /// The zero reference, rejected at submit time.
    pub const ZERO: Self = Self([0u8; constants::FOREIGN_REF_WIDTH]);

    /// Reference whose last eight bytes hold `value` big-endian.
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; constants::FOREIGN_REF_WIDTH];
        bytes[constants::FOREIGN_REF_WIDTH - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for ForeignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Sequence index of a request inside one exchange's ledger.
///
/// Assigned densely from zero; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SlotId
// ---------------------------------------------------------------------------

/// Historical key of a registry entry. Once removed, never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PairName
// ---------------------------------------------------------------------------

/// Fixed-width display name of an exchange pair (e.g. `"ETH/USDT"`).
///
/// Stored NUL-padded in 32 bytes; equality is plain byte equality.
///
/// Serialized as its text. Deserialization goes through [`PairName::new`],
/// so a decoded name is never empty and never carries NUL bytes. Fields
/// that may hold the zeroed [`PairName::EMPTY`] opt in with
/// `#[serde(with = "pair_name_or_empty")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairName([u8; constants::PAIR_NAME_WIDTH]);

impl PairName {
    /// The zeroed name left behind by a removed registry slot.
    pub const EMPTY: Self = Self([0u8; constants::PAIR_NAME_WIDTH]);

    /// Build a name from text.
    ///
    /// # Errors
    /// Returns [`PairbridgeError::InvalidName`] if the text is empty, wider
    /// than [`constants::PAIR_NAME_WIDTH`] bytes, or contains a NUL byte.
    pub fn new(name: &str) -> Result<Self> {
        let raw = name.as_bytes();
        if raw.is_empty() {
            return Err(PairbridgeError::InvalidName {
                reason: "name must not be empty".into(),
            });
        }
        if raw.len() > constants::PAIR_NAME_WIDTH {
            return Err(PairbridgeError::InvalidName {
                reason: format!(
                    "name is {} bytes, limit is {}",
                    raw.len(),
                    constants::PAIR_NAME_WIDTH
                ),
            });
        }
        if raw.contains(&0) {
            return Err(PairbridgeError::InvalidName {
                reason: "name must not contain NUL bytes".into(),
            });
        }
        let mut bytes = [0u8; constants::PAIR_NAME_WIDTH];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// The name without its NUL padding.
    ///
    /// Bytes only ever come from a `&str` without NULs, so the prefix is
    /// valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let len = self
            .0
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(constants::PAIR_NAME_WIDTH);
        std::str::from_utf8(&self.0[..len]).unwrap_or_default()
    }
}

impl TryFrom<&str> for PairName {
    type Error = PairbridgeError;

    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<String> for PairName {
    type Error = PairbridgeError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(&name)
    }
}

impl From<PairName> for String {
    fn from(name: PairName) -> Self {
        name.as_str().to_owned()
    }
}

impl fmt::Display for PairName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde adapter for name fields that may hold [`PairName::EMPTY`].
///
/// The empty string maps to `EMPTY`; anything else must pass
/// [`PairName::new`].
pub mod pair_name_or_empty {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::PairName;

    pub fn serialize<S: Serializer>(name: &PairName, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(name.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PairName, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(PairName::EMPTY);
        }
        PairName::new(&text).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        Self(rand::random())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ForeignRef {
    pub fn random() -> Self {
        Self(rand::random())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
