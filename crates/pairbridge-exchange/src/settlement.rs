//! Batch settlement of pending transfer requests.
//!
//! One settlement pass:
//! 1. Snapshot the request count `n`
//! 2. Walk indices `[0, n)` in ascending order
//! 3. Skip requests already completed (no double payment)
//! 4. Transfer `amount` from the exchange to `destination`
//! 5. Flip the request to completed and record a `TransferExecuted` event
//!
//! A failed transfer aborts the pass. The caller runs the pass inside
//! [`FungibleAsset::atomically`](crate::asset::FungibleAsset::atomically)
//! against a ledger snapshot, so the asset and the ledger both roll back.

use pairbridge_types::{Address, Amount, Event, PairbridgeError, RequestId, Result};

use crate::asset::AssetTransfers;
use crate::ledger::RequestLedger;

/// Outcome of one settlement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementPass {
    /// Request count captured before the walk.
    pub snapshot: usize,
    /// Requests paid in this pass, in index order.
    pub paid: Vec<PaidRequest>,
    /// Requests inside the snapshot that were already completed.
    pub already_completed: usize,
}

/// One transfer executed by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaidRequest {
    pub id: RequestId,
    pub destination: Address,
    pub amount: Amount,
}

impl SettlementPass {
    /// Total amount paid out by this pass.
    #[must_use]
    pub fn total_paid(&self) -> Amount {
        self.paid
            .iter()
            .fold(Amount::zero(), |acc, p| acc.saturating_add(p.amount))
    }

    /// One `TransferExecuted` event per paid request.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.paid
            .iter()
            .map(|p| Event::TransferExecuted {
                id: p.id,
                destination: p.destination,
                amount: p.amount,
            })
            .collect()
    }
}

/// Pays pending requests out of one exchange's asset balance.
#[derive(Debug, Clone, Copy)]
pub struct Settler {
    /// The exchange address that funds every transfer.
    payer: Address,
}

impl Settler {
    #[must_use]
    pub fn new(payer: Address) -> Self {
        Self { payer }
    }

    /// Run one pass over `ledger`.
    ///
    /// Mutates `ledger` and `assets` as it goes; on error the caller must
    /// discard both (see module docs).
    ///
    /// # Errors
    /// Returns `TransferFailed` wrapping the asset's rejection reason.
    pub fn settle(
        &self,
        ledger: &mut RequestLedger,
        assets: &mut dyn AssetTransfers,
    ) -> Result<SettlementPass> {
        let snapshot = ledger.len();
        let mut pass = SettlementPass {
            snapshot,
            ..SettlementPass::default()
        };

        for index in 0..snapshot {
            let id = RequestId(index as u64);
            let Some(request) = ledger.get(id) else {
                return Err(PairbridgeError::RequestNotFound(id));
            };
            if request.completed {
                pass.already_completed += 1;
                continue;
            }
            let (destination, amount) = (request.destination, request.amount);

            assets
                .transfer(self.payer, destination, amount)
                .map_err(|e| {
                    tracing::warn!(
                        request = %id,
                        destination = %destination,
                        amount = %amount,
                        error = %e,
                        "Settlement transfer rejected"
                    );
                    PairbridgeError::TransferFailed {
                        reason: format!("{id}: {e}"),
                    }
                })?;
            ledger.mark_completed(id)?;

            tracing::debug!(
                request = %id,
                destination = %destination,
                amount = %amount,
                "Transfer executed"
            );
            pass.paid.push(PaidRequest {
                id,
                destination,
                amount,
            });
        }

        Ok(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{FungibleAsset, TokenLedger};
    use pairbridge_types::ForeignRef;

    fn amt(v: u64) -> Amount {
        Amount::from(v)
    }

    fn funded(payer: Address, balance: u64) -> TokenLedger {
        let mut token = TokenLedger::new();
        token.mint(payer, amt(balance)).unwrap();
        token
    }

    #[test]
    fn pays_all_pending_in_order() {
        let payer = Address::from_low_u64(0xE);
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        let mut token = funded(payer, 1000);
        let mut ledger = RequestLedger::new();
        ledger.submit(a, ForeignRef::from_low_u64(1), amt(100)).unwrap();
        ledger.submit(b, ForeignRef::from_low_u64(2), amt(200)).unwrap();

        let pass = Settler::new(payer).settle(&mut ledger, &mut token).unwrap();
        assert_eq!(pass.snapshot, 2);
        assert_eq!(pass.paid.len(), 2);
        assert_eq!(pass.paid[0].id, RequestId(0));
        assert_eq!(pass.paid[1].id, RequestId(1));
        assert_eq!(pass.total_paid(), amt(300));
        assert_eq!(pass.events().len(), 2);

        assert_eq!(FungibleAsset::balance_of(&token, a), amt(100));
        assert_eq!(FungibleAsset::balance_of(&token, b), amt(200));
        assert_eq!(FungibleAsset::balance_of(&token, payer), amt(700));
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn second_pass_pays_nothing() {
        let payer = Address::from_low_u64(0xE);
        let a = Address::from_low_u64(1);
        let mut token = funded(payer, 1000);
        let mut ledger = RequestLedger::new();
        ledger.submit(a, ForeignRef::from_low_u64(1), amt(100)).unwrap();

        let settler = Settler::new(payer);
        settler.settle(&mut ledger, &mut token).unwrap();
        let second = settler.settle(&mut ledger, &mut token).unwrap();
        assert!(second.paid.is_empty());
        assert_eq!(second.already_completed, 1);
        assert_eq!(FungibleAsset::balance_of(&token, a), amt(100));
    }

    #[test]
    fn failing_transfer_surfaces_transfer_failed() {
        let payer = Address::from_low_u64(0xE);
        let a = Address::from_low_u64(1);
        let mut token = funded(payer, 150);
        let mut ledger = RequestLedger::new();
        ledger.submit(a, ForeignRef::from_low_u64(1), amt(100)).unwrap();
        ledger.submit(a, ForeignRef::from_low_u64(2), amt(100)).unwrap();

        let err = Settler::new(payer)
            .settle(&mut ledger, &mut token)
            .unwrap_err();
        assert!(matches!(err, PairbridgeError::TransferFailed { .. }));
    }

    #[test]
    fn empty_ledger_pass_is_empty() {
        let payer = Address::from_low_u64(0xE);
        let mut token = funded(payer, 1);
        let mut ledger = RequestLedger::new();
        let pass = Settler::new(payer).settle(&mut ledger, &mut token).unwrap();
        assert_eq!(pass, SettlementPass::default());
    }
}
