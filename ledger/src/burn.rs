//! Burn lifecycle: proposal, cancellation, confirmation, signatures, cleanup.
//!
//! ```text
//! propose_burn ──► Proposed ──confirm_burn──► Confirmed
//!                     │                           │
//!                cancel_burn                 remove_burn
//!                (refund)                    (admin cleanup)
//! ```
//!
//! Escrowed tokens sit on the ledger's own token account from proposal
//! until the burn is cancelled or confirmed.

use crate::engine::BridgeLedger;
use crate::error::LedgerError;
use crate::receipt::{Callback, Receipt};
use custody_roles::AccessControl;
use custody_store::{BurnStore, LedgerStore, UtxoStore};
use custody_token::TokenLedger;
use custody_types::{Address, AttachedUtxo, BurnId, BurnRequest, BurnState, UtxoKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One signature submitted through `sign_burn`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnSignature {
    pub key: UtxoKey,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl<S, A, T> BridgeLedger<S, A, T>
where
    S: LedgerStore,
    A: AccessControl,
    T: TokenLedger,
{
    /// Propose redeeming `amount` tokens for BTC sent to `receiver`.
    ///
    /// The amount moves from the caller into the ledger's custody account.
    /// If `callback` is given, the receipt carries a notification with the
    /// new burn id for it.
    pub fn propose_burn(
        &mut self,
        caller: &Address,
        amount: u128,
        receiver: String,
        callback: Option<Address>,
    ) -> Result<(BurnId, Receipt), LedgerError> {
        self.run("propose_burn", |call| {
            call.require_verified_user(caller)?;
            if amount < call.params.min_burn_amount {
                return Err(LedgerError::AmountTooLow {
                    amount,
                    minimum: call.params.min_burn_amount,
                });
            }

            let id = call.store.burn_id_counter()?;
            let next = id
                .checked_add(1)
                .ok_or(LedgerError::Arithmetic("burn id counter exhausted"))?;
            call.store
                .put_burn(&BurnRequest::proposed(id, caller.clone(), receiver, amount))?;
            call.store.put_burn_id_counter(next)?;

            let custody = call.self_address.clone();
            call.transfer(caller.clone(), custody, amount);
            call.receipt.callback = callback.map(|target| Callback { target, burn_id: id });

            info!(burn = id, proposer = %caller, amount, "burn proposed");
            Ok(id)
        })
    }

    /// Withdraw a proposed burn and refund the escrow to its proposer.
    pub fn cancel_burn(&mut self, caller: &Address, id: BurnId) -> Result<Receipt, LedgerError> {
        self.run("cancel_burn", |call| {
            let burn = call
                .store
                .get_burn(id)?
                .ok_or(LedgerError::InvalidBurnId(id))?;
            if burn.proposer != *caller && !call.is_gatekeeper(caller) {
                return Err(LedgerError::NotAllowed(caller.to_string()));
            }
            if !burn.is_proposed() {
                return Err(LedgerError::BurnAlreadyConfirmed(id));
            }

            let custody = call.self_address.clone();
            call.transfer(custody, burn.proposer.clone(), burn.amount);
            call.store.delete_burn(id)?;

            info!(burn = id, by = %caller, refund = burn.amount, "burn cancelled");
            Ok(())
        })
        .map(|(_, receipt)| receipt)
    }

    /// Attach custody UTXOs to a proposed burn and burn the tokens.
    ///
    /// Every attached UTXO must be confirmed and spendable; it is consumed
    /// here. Each entry must carry the amount recorded for its UTXO and no
    /// signatures, so the map stored on the request matches custody.
    pub fn confirm_burn(
        &mut self,
        caller: &Address,
        utxos: BTreeMap<UtxoKey, AttachedUtxo>,
        per_utxo_fee: u128,
        id: BurnId,
    ) -> Result<Receipt, LedgerError> {
        self.run("confirm_burn", |call| {
            call.require_gatekeeper(caller)?;
            let mut burn = call
                .store
                .get_burn(id)?
                .ok_or(LedgerError::InvalidBurnId(id))?;
            if burn.state != BurnState::Proposed {
                return Err(LedgerError::InvalidBurnState {
                    id,
                    state: burn.state.to_string(),
                });
            }
            let max = call.params.max_utxo_per_tx_count;
            if utxos.len() as u64 >= u64::from(max) {
                return Err(LedgerError::TooManyUtxos {
                    count: utxos.len(),
                    max,
                });
            }

            let mut covered: u128 = 0;
            let mut total_fee: u128 = 0;
            for (key, entry) in &utxos {
                let stored = call
                    .store
                    .get_utxo(key)?
                    .ok_or_else(|| LedgerError::InvalidUtxoKey(key.to_string()))?;
                if !stored.state.is_spendable() {
                    return Err(LedgerError::InvalidUtxoState(key.to_string()));
                }
                if !entry.signatures.is_empty() {
                    return Err(LedgerError::SignatureCannotBeSet(key.to_string()));
                }
                if entry.amount != stored.amount {
                    return Err(LedgerError::UtxoAmountMismatch {
                        utxo: key.to_string(),
                        stored: stored.amount,
                        supplied: entry.amount,
                    });
                }
                covered = covered
                    .checked_add(stored.amount)
                    .ok_or(LedgerError::Arithmetic("UTXO coverage overflow"))?;
                total_fee = total_fee
                    .checked_add(per_utxo_fee)
                    .ok_or(LedgerError::Arithmetic("network fee overflow"))?;
                call.store.delete_utxo(key)?;
            }

            if covered < burn.amount {
                return Err(LedgerError::AmountTooLow {
                    amount: covered,
                    minimum: burn.amount,
                });
            }
            if total_fee > call.params.max_btc_network_fee {
                return Err(LedgerError::FeeTooHigh {
                    fee: total_fee,
                    max: call.params.max_btc_network_fee,
                });
            }

            let service_fee = call.params.service_fee;
            let burned = burn
                .amount
                .checked_sub(service_fee)
                .ok_or(LedgerError::Arithmetic("burn amount does not cover the service fee"))?;

            let attached = utxos.len();
            burn.attached_utxos = utxos;
            burn.fee = total_fee;
            burn.state = BurnState::Confirmed;
            call.store.put_burn(&burn)?;

            let custody = call.self_address.clone();
            let redeem = call.params.redeem_address.clone();
            let treasury = call.params.treasury_address.clone();
            call.transfer(custody.clone(), redeem, burned);
            call.transfer(custody, treasury, service_fee);
            call.burn(burned);

            info!(
                burn = id,
                utxos = attached,
                covered,
                network_fee = total_fee,
                burned,
                "burn confirmed"
            );
            Ok(())
        })
        .map(|(_, receipt)| receipt)
    }

    /// Record the caller's signatures for UTXOs attached to burn `id`.
    ///
    /// A later signature from the same signer for the same UTXO replaces
    /// the earlier one. The burn's state is never changed.
    pub fn sign_burn(
        &mut self,
        caller: &Address,
        id: BurnId,
        entries: &[BurnSignature],
    ) -> Result<(), LedgerError> {
        self.run("sign_burn", |call| {
            call.require_trusted_signer(caller)?;
            let mut burn = call
                .store
                .get_burn(id)?
                .ok_or(LedgerError::InvalidBurnId(id))?;
            for entry in entries {
                let attached = burn.attached_utxos.get_mut(&entry.key).ok_or_else(|| {
                    LedgerError::UtxoNotPartOfBurn {
                        id,
                        utxo: entry.key.to_string(),
                    }
                })?;
                attached
                    .signatures
                    .insert(caller.clone(), entry.signature.clone());
                debug!(burn = id, utxo = %entry.key, signer = %caller, "burn signature recorded");
            }
            call.store.put_burn(&burn)?;
            Ok(())
        })
        .map(|_| ())
    }

    /// Delete burn `id` in any state.
    ///
    /// The caller is responsible for having checked off-chain that the BTC
    /// transaction was broadcast and finalised.
    pub fn remove_burn(&mut self, caller: &Address, id: BurnId) -> Result<(), LedgerError> {
        self.run("remove_burn", |call| {
            call.require_admin(caller)?;
            let burn = call
                .store
                .get_burn(id)?
                .ok_or(LedgerError::InvalidBurnId(id))?;
            call.store.delete_burn(id)?;
            info!(burn = id, state = %burn.state, admin = %caller, "burn removed");
            Ok(())
        })
        .map(|_| ())
    }
}
