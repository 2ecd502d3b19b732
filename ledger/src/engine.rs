//! The bridge ledger engine: call execution, administration and queries.
//!
//! Entrypoints are spread over several modules by concern ([`crate::observe`],
//! [`crate::mint`], [`crate::burn`]); all of them run through
//! [`BridgeLedger::run`], which gives each call an all-or-nothing view of
//! the store and defers token movements until local writes are committed.

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::receipt::Receipt;
use crate::snapshot::LedgerSnapshot;
use custody_nullables::NullStore;
use custody_roles::{AccessControl, RoleRegistry};
use custody_store::{LedgerStore, MetaStore, StagedStore, UtxoStore, WhitelistStore};
use custody_token::{Entrypoint, TokenLedger, TokenOperation};
use custody_types::{
    Address, BridgeParams, BurnId, BurnRequest, CandidateSet, ParamUpdate, UtxoKey, UtxoRecord,
    UtxoState,
};
use tracing::{debug, info, warn};

/// The custody bridge ledger.
///
/// Owns its store exclusively. Role membership is answered by `A`, token
/// balances live in `T`; the engine only issues operations against them.
pub struct BridgeLedger<S, A, T> {
    store: S,
    access: A,
    token: T,
    self_address: Address,
}

/// Per-call context handed to entrypoint bodies.
pub(crate) struct Call<'a, S: LedgerStore + ?Sized, A> {
    pub(crate) store: StagedStore<'a, S>,
    access: &'a A,
    pub(crate) self_address: &'a Address,
    /// Parameters as of the start of the call.
    pub(crate) params: BridgeParams,
    pub(crate) receipt: Receipt,
}

impl<S: LedgerStore + ?Sized, A: AccessControl> Call<'_, S, A> {
    pub(crate) fn require_admin(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.access.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin(caller.to_string()))
        }
    }

    pub(crate) fn require_gatekeeper(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.access.is_gatekeeper(caller) {
            Ok(())
        } else {
            Err(LedgerError::NotGatekeeper(caller.to_string()))
        }
    }

    pub(crate) fn require_trusted_signer(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.access.is_trusted_signer(caller) {
            Ok(())
        } else {
            Err(LedgerError::NotTrustedSigner(caller.to_string()))
        }
    }

    /// Verified users are the ledger's own whitelist.
    pub(crate) fn require_verified_user(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.store.is_whitelisted(caller)? {
            Ok(())
        } else {
            Err(LedgerError::NotVerifiedUser(caller.to_string()))
        }
    }

    pub(crate) fn is_gatekeeper(&self, caller: &Address) -> bool {
        self.access.is_gatekeeper(caller)
    }

    pub(crate) fn transfer(&mut self, from: Address, to: Address, amount: u128) {
        self.receipt
            .token_ops
            .push(TokenOperation::Transfer { from, to, amount });
    }

    pub(crate) fn mint(&mut self, to: Address, amount: u128) {
        self.receipt.token_ops.push(TokenOperation::Mint { to, amount });
    }

    pub(crate) fn burn(&mut self, amount: u128) {
        self.receipt.token_ops.push(TokenOperation::Burn { amount });
    }
}

impl<S, A, T> BridgeLedger<S, A, T>
where
    S: LedgerStore,
    A: AccessControl,
    T: TokenLedger,
{
    /// Build a ledger on top of `store`.
    ///
    /// The token ledger's `transfer`, `mint` and `burn` entrypoints are
    /// resolved here once; a missing one is a fatal configuration error.
    pub fn new(store: S, access: A, token: T, self_address: Address) -> Result<Self, LedgerError> {
        for entrypoint in Entrypoint::ALL {
            if !token.has_entrypoint(entrypoint) {
                return Err(LedgerError::InvalidEntrypoint(entrypoint.name()));
            }
        }
        info!(ledger = %self_address, "bridge ledger initialised");
        Ok(Self {
            store,
            access,
            token,
            self_address,
        })
    }

    /// Execute one call all-or-nothing.
    ///
    /// `body` works against a staged overlay. If it succeeds the overlay is
    /// committed and the collected token operations are executed as one
    /// batch; a token failure reverts the committed writes.
    pub(crate) fn run<R>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Call<'_, S, A>) -> Result<R, LedgerError>,
    ) -> Result<(R, Receipt), LedgerError> {
        let (value, batch, receipt) = {
            let mut call = Call {
                params: self.store.get_params()?,
                store: StagedStore::new(&self.store),
                access: &self.access,
                self_address: &self.self_address,
                receipt: Receipt::default(),
            };
            let value = body(&mut call).map_err(|e| {
                debug!(call = name, tag = e.tag(), error = %e, "call rejected");
                e
            })?;
            (value, call.store.into_batch(), call.receipt)
        };

        let undo = batch.undo_against(&self.store)?;
        let writes = batch.len();
        self.store.commit(batch)?;

        if !receipt.token_ops.is_empty() {
            if let Err(e) = self.token.execute(&receipt.token_ops) {
                warn!(call = name, error = %e, "token ledger rejected call; reverting");
                self.store.commit(undo)?;
                return Err(e.into());
            }
        }
        debug!(call = name, writes, token_ops = receipt.token_ops.len(), "call committed");
        Ok((value, receipt))
    }

    // ── Administrative overrides ────────────────────────────────────────

    /// Create or overwrite a UTXO record directly, bypassing consensus.
    ///
    /// Emergency correction path for administrators. `state` is the wire
    /// code of [`UtxoState`]; anything else fails `InvalidUtxoState`.
    pub fn set_utxo(
        &mut self,
        caller: &Address,
        key: UtxoKey,
        receiver: Option<Address>,
        amount: u128,
        state: u8,
    ) -> Result<(), LedgerError> {
        self.run("set_utxo", |call| {
            call.require_admin(caller)?;
            let state = UtxoState::try_from(state)
                .map_err(|e| LedgerError::InvalidUtxoState(format!("{key}: {e}")))?;
            let record = UtxoRecord {
                state,
                receiver,
                amount,
            };
            call.store.put_utxo(&key, &record)?;
            warn!(admin = %caller, utxo = %key, %state, amount, "UTXO overridden by administrator");
            Ok(())
        })
        .map(|_| ())
    }

    /// Delete a UTXO record directly. Removing an absent key is a no-op.
    pub fn remove_utxo(&mut self, caller: &Address, key: &UtxoKey) -> Result<(), LedgerError> {
        self.run("remove_utxo", |call| {
            call.require_admin(caller)?;
            call.store.delete_utxo(key)?;
            warn!(admin = %caller, utxo = %key, "UTXO removed by administrator");
            Ok(())
        })
        .map(|_| ())
    }

    /// Change one bridge parameter.
    pub fn update_param(&mut self, caller: &Address, update: ParamUpdate) -> Result<(), LedgerError> {
        self.run("update_param", |call| {
            call.require_admin(caller)?;
            let name = update.name();
            let mut params = call.params.clone();
            params.apply(update);
            call.store.put_params(&params)?;
            info!(admin = %caller, param = name, "bridge parameter updated");
            Ok(())
        })
        .map(|_| ())
    }

    pub fn set_max_utxo_per_tx_count(&mut self, caller: &Address, count: u32) -> Result<(), LedgerError> {
        self.update_param(caller, ParamUpdate::MaxUtxoPerTxCount(count))
    }

    /// Add `address` to, or remove it from, the verified-user whitelist.
    pub fn verify_address(
        &mut self,
        caller: &Address,
        address: &Address,
        verified: bool,
    ) -> Result<(), LedgerError> {
        self.run("verify_address", |call| {
            call.require_gatekeeper(caller)?;
            if verified {
                call.store.put_whitelisted(address)?;
            } else {
                call.store.delete_whitelisted(address)?;
            }
            info!(gatekeeper = %caller, address = %address, verified, "verified-user whitelist updated");
            Ok(())
        })
        .map(|_| ())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Id of the most recently proposed burn, `None` before the first one.
    pub fn latest_burn_id(&self) -> Result<Option<BurnId>, LedgerError> {
        Ok(self.store.burn_id_counter()?.checked_sub(1))
    }

    pub fn utxo(&self, key: &UtxoKey) -> Result<Option<UtxoRecord>, LedgerError> {
        Ok(self.store.get_utxo(key)?)
    }

    pub fn candidates(&self, key: &UtxoKey) -> Result<Option<CandidateSet>, LedgerError> {
        Ok(self.store.get_candidates(key)?)
    }

    pub fn burn(&self, id: BurnId) -> Result<Option<BurnRequest>, LedgerError> {
        Ok(self.store.get_burn(id)?)
    }

    pub fn params(&self) -> Result<BridgeParams, LedgerError> {
        Ok(self.store.get_params()?)
    }

    pub fn is_verified_user(&self, address: &Address) -> Result<bool, LedgerError> {
        Ok(self.store.is_whitelisted(address)?)
    }

    pub fn self_address(&self) -> &Address {
        &self.self_address
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        LedgerSnapshot::capture(&self.store)
    }

    /// Replace the ledger's persisted state with a verified snapshot.
    pub fn restore(&mut self, snapshot: LedgerSnapshot) -> Result<(), LedgerError> {
        if !snapshot.verify() {
            return Err(LedgerError::Snapshot("snapshot hash mismatch".to_string()));
        }
        let batch = snapshot.restore_batch(&self.store)?;
        self.store.commit(batch)?;
        info!("ledger state restored from snapshot");
        Ok(())
    }
}

impl<T: TokenLedger> BridgeLedger<NullStore, RoleRegistry, T> {
    /// An in-memory ledger set up from `config`.
    pub fn from_config(config: &LedgerConfig, token: T) -> Result<Self, LedgerError> {
        config.validate()?;
        Self::new(
            NullStore::with_params(config.bridge_params()),
            config.build_roles(),
            token,
            config.self_address.clone(),
        )
    }
}

/// Role administration, available when the ledger owns its role registry.
impl<S, T> BridgeLedger<S, RoleRegistry, T>
where
    S: LedgerStore,
    T: TokenLedger,
{
    pub fn propose_administrator(&mut self, caller: &Address, proposed: &Address) -> Result<(), LedgerError> {
        Ok(self.access.propose_administrator(caller, proposed)?)
    }

    pub fn accept_admin_proposal(&mut self, caller: &Address) -> Result<(), LedgerError> {
        Ok(self.access.accept_admin_proposal(caller)?)
    }

    pub fn remove_administrator(&mut self, caller: &Address, target: &Address) -> Result<(), LedgerError> {
        Ok(self.access.remove_administrator(caller, target)?)
    }

    pub fn add_gatekeeper(&mut self, caller: &Address, gatekeeper: &Address) -> Result<(), LedgerError> {
        Ok(self.access.add_gatekeeper(caller, gatekeeper)?)
    }

    pub fn remove_gatekeeper(&mut self, caller: &Address, gatekeeper: &Address) -> Result<(), LedgerError> {
        Ok(self.access.remove_gatekeeper(caller, gatekeeper)?)
    }

    pub fn add_trusted_signer(&mut self, caller: &Address, signer: &Address) -> Result<(), LedgerError> {
        Ok(self.access.add_trusted_signer(caller, signer)?)
    }

    pub fn remove_trusted_signer(&mut self, caller: &Address, signer: &Address) -> Result<(), LedgerError> {
        Ok(self.access.remove_trusted_signer(caller, signer)?)
    }
}
