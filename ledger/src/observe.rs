//! Observation entrypoints: signers reporting deposits and change outputs.

use crate::engine::BridgeLedger;
use crate::error::LedgerError;
use custody_consensus::{ObservationConsensus, ObservationMode, ObservationOutcome};
use custody_roles::AccessControl;
use custody_store::LedgerStore;
use custody_token::TokenLedger;
use custody_types::{Address, CandidateKey, UtxoKey};
use serde::{Deserialize, Serialize};

/// A change output reported by a trusted signer after a custody spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOutput {
    pub key: UtxoKey,
    pub amount: u128,
}

impl<S, A, T> BridgeLedger<S, A, T>
where
    S: LedgerStore,
    A: AccessControl,
    T: TokenLedger,
{
    /// Report a user deposit of `amount` to be minted for `receiver`.
    ///
    /// Deposits that cannot cover the service fee are rejected before
    /// anything is recorded.
    pub fn confirm_utxo(
        &mut self,
        caller: &Address,
        key: UtxoKey,
        receiver: Address,
        amount: u128,
    ) -> Result<ObservationOutcome, LedgerError> {
        self.run("confirm_utxo", |call| {
            call.require_trusted_signer(caller)?;
            if amount < call.params.service_fee {
                return Err(LedgerError::AmountTooLow {
                    amount,
                    minimum: call.params.service_fee,
                });
            }
            let engine = ObservationConsensus::new(call.params.threshold);
            Ok(engine.observe(
                &mut call.store,
                &key,
                CandidateKey::deposit(receiver, amount),
                caller,
                ObservationMode::Deposit,
            )?)
        })
        .map(|(outcome, _)| outcome)
    }

    /// Report change outputs of a custody spend, in order.
    ///
    /// Outputs that are already confirmed are skipped. Any other failure,
    /// including a repeated vote by the caller, fails the whole batch.
    pub fn confirm_change_utxo(
        &mut self,
        caller: &Address,
        outputs: &[ChangeOutput],
    ) -> Result<Vec<ObservationOutcome>, LedgerError> {
        self.run("confirm_change_utxo", |call| {
            call.require_trusted_signer(caller)?;
            let engine = ObservationConsensus::new(call.params.threshold);
            outputs
                .iter()
                .map(|output| {
                    engine
                        .observe_unsettled(
                            &mut call.store,
                            &output.key,
                            CandidateKey::change(output.amount),
                            caller,
                            ObservationMode::Change,
                        )
                        .map_err(LedgerError::from)
                })
                .collect()
        })
        .map(|(outcomes, _)| outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_nullables::NullStore;
    use custody_roles::RoleRegistry;
    use custody_token::MemoryToken;
    use custody_types::{BridgeParams, UtxoState};

    fn addr(s: &str) -> Address {
        Address::new(format!("tz1{s}"))
    }

    fn ledger(threshold: u32) -> BridgeLedger<NullStore, RoleRegistry, MemoryToken> {
        let mut roles = RoleRegistry::with_admins([addr("admin")]);
        for s in ["s1", "s2", "s3"] {
            roles.add_trusted_signer(&addr("admin"), &addr(s)).unwrap();
        }
        let params = BridgeParams {
            threshold,
            ..BridgeParams::default()
        };
        BridgeLedger::new(
            NullStore::with_params(params),
            roles,
            MemoryToken::new(addr("redeem")),
            addr("ledger"),
        )
        .unwrap()
    }

    fn key(n: u8) -> UtxoKey {
        UtxoKey::new(vec![n; 32], 0)
    }

    #[test]
    fn only_trusted_signers_observe() {
        let mut l = ledger(2);
        let err = l.confirm_utxo(&addr("eve"), key(1), addr("bob"), 1000).unwrap_err();
        assert_eq!(err.tag(), "NotTrustedSigner");
        let err = l
            .confirm_change_utxo(&addr("eve"), &[ChangeOutput { key: key(1), amount: 5 }])
            .unwrap_err();
        assert_eq!(err.tag(), "NotTrustedSigner");
    }

    #[test]
    fn deposit_below_service_fee_writes_nothing() {
        let mut l = ledger(1);
        let err = l.confirm_utxo(&addr("s1"), key(1), addr("bob"), 50).unwrap_err();
        assert_eq!(err.tag(), "AmountTooLow");
        assert!(l.candidates(&key(1)).unwrap().is_none());
        assert!(l.utxo(&key(1)).unwrap().is_none());
    }

    #[test]
    fn change_batch_skips_settled_keys() {
        let mut l = ledger(1);
        l.confirm_change_utxo(&addr("s1"), &[ChangeOutput { key: key(1), amount: 10 }])
            .unwrap();
        let outcomes = l
            .confirm_change_utxo(
                &addr("s2"),
                &[
                    ChangeOutput { key: key(1), amount: 99 },
                    ChangeOutput { key: key(2), amount: 20 },
                ],
            )
            .unwrap();
        assert_eq!(outcomes[0], ObservationOutcome::Skipped);
        assert!(outcomes[1].is_promoted());
        assert_eq!(l.utxo(&key(1)).unwrap().unwrap().amount, 10);
        assert_eq!(l.utxo(&key(2)).unwrap().unwrap().state, UtxoState::SpentForMint);
    }

    #[test]
    fn failing_batch_entry_reverts_earlier_entries() {
        let mut l = ledger(3);
        l.confirm_change_utxo(&addr("s1"), &[ChangeOutput { key: key(2), amount: 20 }])
            .unwrap();
        let err = l
            .confirm_change_utxo(
                &addr("s1"),
                &[
                    ChangeOutput { key: key(1), amount: 10 },
                    ChangeOutput { key: key(2), amount: 20 },
                ],
            )
            .unwrap_err();
        assert_eq!(err.tag(), "SignerAlreadyConfirmed");
        assert!(l.candidates(&key(1)).unwrap().is_none());
    }
}
