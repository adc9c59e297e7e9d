//! The per-pair exchange contract.
//!
//! An [`Exchange`] owns one [`RequestLedger`], holds a handle to the asset
//! it pays out, and exposes the public operations: request intake,
//! settlement, withdrawal, and ownership transfer.
//!
//! Every mutating operation is all-or-nothing. State that can be touched
//! by a failing step is snapshotted first and restored on error; events are
//! buffered and committed to the [`EventLog`] only on success.

use pairbridge_types::{
    Address, Amount, Event, ForeignRef, LedgerConfig, PairName, PairbridgeError, RequestId,
    Result, TransferRequest,
};

use crate::access::Authority;
use crate::asset::FungibleAsset;
use crate::events::EventLog;
use crate::ledger::RequestLedger;
use crate::settlement::{SettlementPass, Settler};

/// Construction parameters of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeParams {
    /// Address this exchange is reachable at.
    pub address: Address,
    /// Pair display name (e.g. `"ETH/USDT"`).
    pub name: PairName,
    pub rate_a: Amount,
    pub rate_b: Amount,
    /// Address of the asset contract the exchange pays out.
    pub token: Address,
    /// Second privileged principal (owner of the asset).
    pub token_owner: Address,
    /// Initial contract owner.
    pub owner: Address,
    pub ledger: LedgerConfig,
}

/// One pair exchange: request ledger plus settlement against asset `A`.
#[derive(Debug)]
pub struct Exchange<A: FungibleAsset> {
    address: Address,
    name: PairName,
    rate_a: Amount,
    rate_b: Amount,
    token: Address,
    authority: Authority,
    ledger: RequestLedger,
    asset: A,
    events: EventLog,
}

impl<A: FungibleAsset> Exchange<A> {
    #[must_use]
    pub fn new(params: ExchangeParams, asset: A, events: EventLog) -> Self {
        tracing::info!(
            exchange = %params.address,
            name = %params.name,
            owner = %params.owner,
            token = %params.token,
            "Exchange created"
        );
        Self {
            address: params.address,
            name: params.name,
            rate_a: params.rate_a,
            rate_b: params.rate_b,
            token: params.token,
            authority: Authority::new(params.owner, params.token_owner),
            ledger: RequestLedger::with_config(&params.ledger),
            asset,
            events,
        }
    }

    // -----------------------------------------------------------------
    // Request intake
    // -----------------------------------------------------------------

    /// Queue a transfer of `amount` to `destination` for `foreign_ref`.
    ///
    /// Open to any caller.
    ///
    /// # Errors
    /// `DuplicateRequest`, `InvalidAmount`, `InvalidReference`,
    /// `InvalidDestination`, `LedgerFull`. The ledger is unchanged on error.
    pub fn submit(
        &mut self,
        destination: Address,
        foreign_ref: ForeignRef,
        amount: Amount,
    ) -> Result<RequestId> {
        let id = self
            .ledger
            .submit(destination, foreign_ref, amount)
            .inspect_err(|e| {
                tracing::warn!(
                    exchange = %self.address,
                    foreign_ref = %foreign_ref,
                    error = %e,
                    "Request rejected"
                );
            })?;
        let count = self.ledger.len() as u64;

        tracing::info!(
            exchange = %self.address,
            request = %id,
            count,
            amount = %amount,
            "Request submitted"
        );
        self.events.emit(
            self.address,
            Event::RequestSubmitted {
                count,
                id,
                foreign_ref,
                amount,
            },
        );
        Ok(id)
    }

    /// Whether `foreign_ref` was ever submitted here.
    #[must_use]
    pub fn exists(&self, foreign_ref: &ForeignRef) -> bool {
        self.ledger.exists(foreign_ref)
    }

    // -----------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------

    /// Pay every pending request. Operator only.
    ///
    /// Returns `false` when the ledger has never received a request, and
    /// `true` otherwise, including when every request was already paid.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` is the owner or token owner
    /// - `TransferFailed` if any transfer is rejected; nothing is paid
    pub fn settle_all(&mut self, caller: Address) -> Result<bool> {
        Ok(self.settle_all_with_report(caller)?.is_some())
    }

    /// Like [`Exchange::settle_all`], returning the pass details.
    /// `None` means the ledger was empty.
    pub fn settle_all_with_report(&mut self, caller: Address) -> Result<Option<SettlementPass>> {
        self.authority.ensure_operator(caller)?;
        if self.ledger.is_empty() {
            tracing::debug!(exchange = %self.address, "Settlement skipped: empty ledger");
            return Ok(None);
        }

        let settler = Settler::new(self.address);
        let checkpoint = self.ledger.clone();
        let ledger = &mut self.ledger;
        let outcome = self
            .asset
            .atomically(|assets| settler.settle(ledger, assets));

        match outcome {
            Ok(pass) => {
                tracing::info!(
                    exchange = %self.address,
                    snapshot = pass.snapshot,
                    paid = pass.paid.len(),
                    already_completed = pass.already_completed,
                    total = %pass.total_paid(),
                    "Settlement pass committed"
                );
                self.events.commit(self.address, pass.events());
                Ok(Some(pass))
            }
            Err(e) => {
                self.ledger = checkpoint;
                tracing::warn!(
                    exchange = %self.address,
                    error = %e,
                    "Settlement pass rolled back"
                );
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------
    // Withdrawal
    // -----------------------------------------------------------------

    /// Sweep the exchange's whole asset balance to `caller`. Operator only.
    ///
    /// Returns the amount moved. A zero balance moves nothing and emits no
    /// event.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` is the owner or token owner
    /// - `TransferFailed` if the asset rejects the transfer
    pub fn withdraw(&mut self, caller: Address) -> Result<Amount> {
        self.authority.ensure_operator(caller)?;
        let from = self.address;

        let amount = self.asset.atomically(|assets| {
            let balance = assets.balance_of(from);
            if balance.is_zero() {
                return Ok(balance);
            }
            assets
                .transfer(from, caller, balance)
                .map_err(|e| PairbridgeError::TransferFailed {
                    reason: e.to_string(),
                })?;
            Ok(balance)
        })?;

        if !amount.is_zero() {
            tracing::info!(exchange = %self.address, to = %caller, amount = %amount, "Withdrawn");
            self.events.emit(self.address, Event::Withdrawn { to: caller, amount });
        }
        Ok(amount)
    }

    // -----------------------------------------------------------------
    // Ownership
    // -----------------------------------------------------------------

    /// Hand contract ownership to `new_owner`. Current owner only.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        let previous_owner = self.authority.transfer_ownership(caller, new_owner)?;
        tracing::info!(
            exchange = %self.address,
            previous_owner = %previous_owner,
            new_owner = %new_owner,
            "Exchange ownership transferred"
        );
        self.events.emit(
            self.address,
            Event::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> PairName {
        self.name
    }

    /// `(rate_a, rate_b)` as given at construction.
    #[must_use]
    pub fn rates(&self) -> (Amount, Amount) {
        (self.rate_a, self.rate_b)
    }

    #[must_use]
    pub fn token(&self) -> Address {
        self.token
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.authority.owner()
    }

    #[must_use]
    pub fn token_owner(&self) -> Address {
        self.authority.token_owner()
    }

    /// The exchange's own balance of its asset.
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.asset.balance_of(self.address)
    }

    /// # Errors
    /// Returns `RequestNotFound` if no request has this id.
    pub fn request(&self, id: RequestId) -> Result<&TransferRequest> {
        self.ledger.get(id).ok_or(PairbridgeError::RequestNotFound(id))
    }

    /// Request counter: number of requests ever submitted.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.ledger.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.ledger.pending_count()
    }

    /// All requests in sequence order, completed ones included.
    pub fn requests(&self) -> impl Iterator<Item = &TransferRequest> {
        self.ledger.iter()
    }

    #[must_use]
    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::TokenLedger;
    use pairbridge_types::EventKind;

    const OWNER: u64 = 0x01;
    const TOKEN_OWNER: u64 = 0x02;
    const USER: u64 = 0x03;
    const EXCHANGE: u64 = 0xE0;

    fn amt(v: u64) -> Amount {
        Amount::from(v)
    }

    fn addr(v: u64) -> Address {
        Address::from_low_u64(v)
    }

    fn make_exchange(funding: u64) -> (Exchange<TokenLedger>, EventLog) {
        let mut token = TokenLedger::new();
        if funding > 0 {
            token.mint(addr(EXCHANGE), amt(funding)).unwrap();
        }
        let events = EventLog::new();
        let params = ExchangeParams {
            address: addr(EXCHANGE),
            name: PairName::new("ETH/USDT").unwrap(),
            rate_a: amt(1),
            rate_b: amt(2),
            token: addr(0x70),
            token_owner: addr(TOKEN_OWNER),
            owner: addr(OWNER),
            ledger: LedgerConfig::default(),
        };
        (Exchange::new(params, token, events.clone()), events)
    }

    #[test]
    fn submit_emits_event_with_count() {
        let (mut ex, events) = make_exchange(0);
        let fr = ForeignRef::from_low_u64(0xAAA);
        let id = ex.submit(addr(USER), fr, amt(100)).unwrap();
        assert_eq!(id, RequestId(0));
        assert!(ex.exists(&fr));

        let records = events.of_kind(EventKind::RequestSubmitted);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].event,
            Event::RequestSubmitted {
                count: 1,
                id: RequestId(0),
                foreign_ref: fr,
                amount: amt(100),
            }
        );
        assert_eq!(records[0].emitter, addr(EXCHANGE));
    }

    #[test]
    fn rejected_submit_emits_nothing() {
        let (mut ex, events) = make_exchange(0);
        assert!(ex.submit(addr(USER), ForeignRef::ZERO, amt(1)).is_err());
        assert!(events.is_empty());
        assert_eq!(ex.request_count(), 0);
    }

    #[test]
    fn settle_empty_ledger_returns_false() {
        let (mut ex, events) = make_exchange(100);
        assert!(!ex.settle_all(addr(OWNER)).unwrap());
        assert!(events.is_empty());
    }

    #[test]
    fn settle_requires_operator() {
        let (mut ex, _) = make_exchange(100);
        ex.submit(addr(USER), ForeignRef::from_low_u64(1), amt(10)).unwrap();
        let err = ex.settle_all(addr(USER)).unwrap_err();
        assert!(matches!(err, PairbridgeError::Unauthorized { .. }));
        assert_eq!(ex.pending_count(), 1);
    }

    #[test]
    fn token_owner_may_settle() {
        let (mut ex, _) = make_exchange(100);
        ex.submit(addr(USER), ForeignRef::from_low_u64(1), amt(10)).unwrap();
        assert!(ex.settle_all(addr(TOKEN_OWNER)).unwrap());
        assert_eq!(ex.pending_count(), 0);
    }

    #[test]
    fn requests_iterate_in_sequence_order() {
        let (mut ex, _) = make_exchange(100);
        for i in 1..=3 {
            ex.submit(addr(USER), ForeignRef::from_low_u64(i), amt(i)).unwrap();
        }
        ex.settle_all(addr(OWNER)).unwrap();
        ex.submit(addr(USER), ForeignRef::from_low_u64(9), amt(9)).unwrap();

        let ids: Vec<RequestId> = ex.requests().map(|r| r.id).collect();
        assert_eq!(ids, vec![RequestId(0), RequestId(1), RequestId(2), RequestId(3)]);
        assert_eq!(ex.requests().filter(|r| r.is_pending()).count(), 1);
    }

    #[test]
    fn settle_pays_and_is_idempotent() {
        let (mut ex, events) = make_exchange(1000);
        ex.submit(addr(USER), ForeignRef::from_low_u64(0xAAA), amt(100)).unwrap();

        assert!(ex.settle_all(addr(OWNER)).unwrap());
        assert!(ex.request(RequestId(0)).unwrap().completed);
        assert_eq!(ex.balance(), amt(900));

        // Second call: ledger non-empty, nothing pending.
        let before = ex.ledger().clone();
        assert!(ex.settle_all(addr(OWNER)).unwrap());
        assert_eq!(ex.ledger(), &before);
        assert_eq!(ex.balance(), amt(900));
        assert_eq!(events.of_kind(EventKind::TransferExecuted).len(), 1);
    }

    #[test]
    fn failed_settlement_rolls_back_everything() {
        let (mut ex, events) = make_exchange(150);
        ex.submit(addr(USER), ForeignRef::from_low_u64(1), amt(100)).unwrap();
        ex.submit(addr(USER), ForeignRef::from_low_u64(2), amt(100)).unwrap();
        let events_before = events.len();

        let err = ex.settle_all(addr(OWNER)).unwrap_err();
        assert!(matches!(err, PairbridgeError::TransferFailed { .. }));

        // First transfer of the pass is undone as well.
        assert_eq!(ex.balance(), amt(150));
        assert_eq!(ex.pending_count(), 2);
        assert!(!ex.request(RequestId(0)).unwrap().completed);
        assert_eq!(events.len(), events_before);
    }

    #[test]
    fn withdraw_sweeps_balance() {
        let (mut ex, events) = make_exchange(500);
        let moved = ex.withdraw(addr(TOKEN_OWNER)).unwrap();
        assert_eq!(moved, amt(500));
        assert_eq!(ex.balance(), Amount::zero());
        assert_eq!(events.of_kind(EventKind::Withdrawn).len(), 1);

        // Nothing left: no transfer, no event.
        assert_eq!(ex.withdraw(addr(OWNER)).unwrap(), Amount::zero());
        assert_eq!(events.of_kind(EventKind::Withdrawn).len(), 1);
    }

    #[test]
    fn withdraw_requires_operator() {
        let (mut ex, _) = make_exchange(500);
        assert!(matches!(
            ex.withdraw(addr(USER)),
            Err(PairbridgeError::Unauthorized { .. })
        ));
        assert_eq!(ex.balance(), amt(500));
    }

    #[test]
    fn ownership_transfer_changes_operator() {
        let (mut ex, events) = make_exchange(0);
        ex.transfer_ownership(addr(OWNER), addr(USER)).unwrap();
        assert_eq!(ex.owner(), addr(USER));
        assert_eq!(events.of_kind(EventKind::OwnershipTransferred).len(), 1);
        assert!(matches!(
            ex.transfer_ownership(addr(OWNER), addr(OWNER)),
            Err(PairbridgeError::Unauthorized { .. })
        ));
    }

    #[test]
    fn construction_parameters_exposed() {
        let (ex, _) = make_exchange(0);
        assert_eq!(ex.name().as_str(), "ETH/USDT");
        assert_eq!(ex.rates(), (amt(1), amt(2)));
        assert_eq!(ex.token(), addr(0x70));
        assert_eq!(ex.token_owner(), addr(TOKEN_OWNER));
        assert!(matches!(
            ex.request(RequestId(0)),
            Err(PairbridgeError::RequestNotFound(_))
        ));
    }
}
