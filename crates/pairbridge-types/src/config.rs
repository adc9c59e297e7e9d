//! Configuration types for exchanges and the registry.

use serde::{Deserialize, Serialize};

use crate::{PairbridgeError, Result, constants};

/// Per-exchange ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of requests (pending + completed) the ledger holds.
    pub max_requests: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_requests: constants::DEFAULT_MAX_REQUESTS,
        }
    }
}

/// Registry (factory) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of slots ever handed out, removed ones included.
    pub max_entries: usize,
    /// Ledger settings applied to every exchange the registry deploys.
    pub ledger: LedgerConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entries: constants::DEFAULT_MAX_REGISTRY_ENTRIES,
            ledger: LedgerConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`PairbridgeError::Configuration`] on malformed JSON or a
    /// zero capacity.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| PairbridgeError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject capacities that would make every insert or submit fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(PairbridgeError::Configuration(
                "max_entries must be > 0".into(),
            ));
        }
        if self.ledger.max_requests == 0 {
            return Err(PairbridgeError::Configuration(
                "ledger.max_requests must be > 0".into(),
            ));
        }
        Ok(())
    }
}
