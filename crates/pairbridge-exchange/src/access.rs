//! Access control for exchanges and the registry.
//!
//! [`Ownership`] is the single-owner collaborator (current owner plus a
//! transfer operation). [`Authority`] adds the exchange's second privileged
//! principal, the token owner: either one may run settlement and
//! withdrawals.

use pairbridge_types::{Address, PairbridgeError, Result};
use serde::{Deserialize, Serialize};

/// Single-owner gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    #[must_use]
    pub fn current_owner(&self) -> Address {
        self.owner
    }

    #[must_use]
    pub fn is_owner(&self, caller: Address) -> bool {
        caller == self.owner
    }

    /// # Errors
    /// Returns [`PairbridgeError::Unauthorized`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, owner = %self.owner, "Owner check rejected caller");
            Err(PairbridgeError::Unauthorized { caller })
        }
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the current owner
    /// - `InvalidOwner` if `new_owner` is the zero address
    pub fn transfer(&mut self, caller: Address, new_owner: Address) -> Result<Address> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(PairbridgeError::InvalidOwner);
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        Ok(previous)
    }
}

/// Operator predicate over two principals: the contract owner and the
/// token owner. Either satisfies the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    ownership: Ownership,
    token_owner: Address,
}

impl Authority {
    #[must_use]
    pub fn new(owner: Address, token_owner: Address) -> Self {
        Self {
            ownership: Ownership::new(owner),
            token_owner,
        }
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.ownership.current_owner()
    }

    #[must_use]
    pub fn token_owner(&self) -> Address {
        self.token_owner
    }

    #[must_use]
    pub fn is_operator(&self, caller: Address) -> bool {
        self.ownership.is_owner(caller) || caller == self.token_owner
    }

    /// # Errors
    /// Returns [`PairbridgeError::Unauthorized`] unless `caller` is the
    /// owner or the token owner.
    pub fn ensure_operator(&self, caller: Address) -> Result<()> {
        if self.is_operator(caller) {
            Ok(())
        } else {
            tracing::warn!(
                caller = %caller,
                owner = %self.owner(),
                token_owner = %self.token_owner,
                "Operator check rejected caller"
            );
            Err(PairbridgeError::Unauthorized { caller })
        }
    }

    /// Transfer contract ownership. The token owner is not affected.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<Address> {
        self.ownership.transfer(caller, new_owner)
    }
}
