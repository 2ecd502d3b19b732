//! Mint dispatcher: turn a confirmed deposit into tokens.

use crate::engine::BridgeLedger;
use crate::error::LedgerError;
use crate::receipt::Receipt;
use custody_roles::AccessControl;
use custody_store::{LedgerStore, UtxoStore};
use custody_token::TokenLedger;
use custody_types::{Address, UtxoKey, UtxoState};
use tracing::info;

impl<S, A, T> BridgeLedger<S, A, T>
where
    S: LedgerStore,
    A: AccessControl,
    T: TokenLedger,
{
    /// Mint the deposit held by `key` for its receiver, less the service fee,
    /// and the service fee for the treasury.
    ///
    /// The record stays in the store as `SpentForMint`, so a second mint of
    /// the same key fails `InvalidUtxoState`.
    pub fn mint(&mut self, caller: &Address, key: &UtxoKey) -> Result<Receipt, LedgerError> {
        self.run("mint", |call| {
            call.require_gatekeeper(caller)?;
            let mut record = call
                .store
                .get_utxo(key)?
                .ok_or_else(|| LedgerError::InvalidUtxoKey(key.to_string()))?;
            if !record.state.is_mintable() {
                return Err(LedgerError::InvalidUtxoState(key.to_string()));
            }
            let receiver = record
                .receiver
                .clone()
                .ok_or_else(|| LedgerError::ReceiverNotSet(key.to_string()))?;

            record.state = UtxoState::SpentForMint;
            call.store.put_utxo(key, &record)?;

            let fee = call.params.service_fee;
            let entitled = record
                .amount
                .checked_sub(fee)
                .ok_or(LedgerError::Arithmetic("deposit does not cover the service fee"))?;
            let treasury = call.params.treasury_address.clone();
            call.mint(receiver.clone(), entitled);
            call.mint(treasury, fee);

            info!(utxo = %key, receiver = %receiver, amount = entitled, fee, "deposit minted");
            Ok(())
        })
        .map(|(_, receipt)| receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_nullables::NullStore;
    use custody_roles::RoleRegistry;
    use custody_token::{MemoryToken, TokenOperation};

    fn addr(s: &str) -> Address {
        Address::new(format!("tz1{s}"))
    }

    fn ledger() -> BridgeLedger<NullStore, RoleRegistry, MemoryToken> {
        let mut roles = RoleRegistry::with_admins([addr("admin")]);
        roles.add_gatekeeper(&addr("admin"), &addr("gk")).unwrap();
        BridgeLedger::new(
            NullStore::new(),
            roles,
            MemoryToken::new(addr("redeem")),
            addr("ledger"),
        )
        .unwrap()
    }

    fn key() -> UtxoKey {
        UtxoKey::new(vec![0xcd; 32], 2)
    }

    #[test]
    fn mint_splits_service_fee() {
        let mut l = ledger();
        l.set_utxo(&addr("admin"), key(), Some(addr("bob")), 1000, 0).unwrap();
        let treasury = l.params().unwrap().treasury_address;

        let receipt = l.mint(&addr("gk"), &key()).unwrap();
        assert_eq!(
            receipt.token_ops,
            vec![
                TokenOperation::Mint { to: addr("bob"), amount: 900 },
                TokenOperation::Mint { to: treasury.clone(), amount: 100 },
            ]
        );
        assert_eq!(l.token().balance_of(&addr("bob")), 900);
        assert_eq!(l.token().balance_of(&treasury), 100);
        assert_eq!(l.utxo(&key()).unwrap().unwrap().state, UtxoState::SpentForMint);
    }

    #[test]
    fn mint_preconditions() {
        let mut l = ledger();
        assert_eq!(l.mint(&addr("admin"), &key()).unwrap_err().tag(), "NotGatekeeper");
        assert_eq!(l.mint(&addr("gk"), &key()).unwrap_err().tag(), "InvalidUtxoKey");

        l.set_utxo(&addr("admin"), key(), None, 1000, 0).unwrap();
        assert_eq!(l.mint(&addr("gk"), &key()).unwrap_err().tag(), "ReceiverNotSet");

        l.set_utxo(&addr("admin"), key(), Some(addr("bob")), 1000, 1).unwrap();
        assert_eq!(l.mint(&addr("gk"), &key()).unwrap_err().tag(), "InvalidUtxoState");
    }

    #[test]
    fn deposit_below_fee_is_an_arithmetic_failure() {
        let mut l = ledger();
        l.set_utxo(&addr("admin"), key(), Some(addr("bob")), 99, 0).unwrap();
        let err = l.mint(&addr("gk"), &key()).unwrap_err();
        assert_eq!(err.tag(), "ArithmeticError");
        assert_eq!(l.utxo(&key()).unwrap().unwrap().state, UtxoState::Initial);
        assert_eq!(l.token().total_supply(), 0);
    }
}
