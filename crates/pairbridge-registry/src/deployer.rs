//! Deployment collaborator.
//!
//! The registry calls a [`Deployer`] exactly once per successful insert to
//! bring a new exchange into existence. The instance is built with its
//! final owner, so a deployment is a single step that either produces a
//! ready exchange or leaves the deployer untouched.

use pairbridge_exchange::{EventLog, Exchange, ExchangeParams, FungibleAsset, SharedExchange};
use pairbridge_types::{Address, Amount, LedgerConfig, PairName, PairbridgeError, Result};

/// Produces exchange instances for the registry.
pub trait Deployer {
    /// Handle the registry keeps for each deployed instance.
    type Instance: Clone;

    /// Deploy a new exchange from `factory`, owned by `owner`. Returns its
    /// address and handle.
    ///
    /// # Errors
    /// Implementations must not change any state when they return an
    /// error.
    fn deploy(
        &mut self,
        factory: Address,
        owner: Address,
        name: PairName,
        rate_a: Amount,
        rate_b: Amount,
    ) -> Result<(Address, Self::Instance)>;
}

/// Deploys [`Exchange`]s that all pay out of the same asset.
///
/// Instance addresses are derived from the factory address and a
/// deployment nonce, so a fresh deployer replays the same addresses.
#[derive(Debug)]
pub struct ExchangeDeployer<A> {
    asset: A,
    token: Address,
    token_owner: Address,
    ledger: LedgerConfig,
    events: EventLog,
    nonce: u64,
}

impl<A: FungibleAsset + Clone> ExchangeDeployer<A> {
    #[must_use]
    pub fn new(
        asset: A,
        token: Address,
        token_owner: Address,
        ledger: LedgerConfig,
        events: EventLog,
    ) -> Self {
        Self {
            asset,
            token,
            token_owner,
            ledger,
            events,
            nonce: 0,
        }
    }

    /// Number of exchanges deployed so far.
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

impl<A: FungibleAsset + Clone> Deployer for ExchangeDeployer<A> {
    type Instance = SharedExchange<A>;

    fn deploy(
        &mut self,
        factory: Address,
        owner: Address,
        name: PairName,
        rate_a: Amount,
        rate_b: Amount,
    ) -> Result<(Address, Self::Instance)> {
        if owner.is_zero() {
            return Err(PairbridgeError::InvalidOwner);
        }
        let next = self
            .nonce
            .checked_add(1)
            .ok_or_else(|| PairbridgeError::DeploymentFailed {
                reason: "deployment nonce exhausted".into(),
            })?;
        let address = Address::derive_contract(factory, self.nonce);

        let params = ExchangeParams {
            address,
            name,
            rate_a,
            rate_b,
            token: self.token,
            token_owner: self.token_owner,
            owner,
            ledger: self.ledger.clone(),
        };
        let exchange = Exchange::new(params, self.asset.clone(), self.events.clone());
        self.nonce = next;
        Ok((address, SharedExchange::new(exchange)))
    }
}
