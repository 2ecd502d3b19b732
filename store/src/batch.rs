//! Write batches: the staged effect of one ledger call.

use crate::{BurnStore, CandidateStore, MetaStore, StoreError, UtxoStore, WhitelistStore};
use custody_types::{Address, BridgeParams, BurnId, BurnRequest, CandidateSet, UtxoKey, UtxoRecord};
use std::collections::BTreeMap;

/// Pending writes against the five ledger maps.
///
/// `Some(value)` is a put, `None` a delete. For the whitelist `true` adds and
/// `false` removes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    pub utxos: BTreeMap<UtxoKey, Option<UtxoRecord>>,
    pub candidates: BTreeMap<UtxoKey, Option<CandidateSet>>,
    pub burns: BTreeMap<BurnId, Option<BurnRequest>>,
    pub whitelist: BTreeMap<Address, bool>,
    pub burn_id_counter: Option<BurnId>,
    pub params: Option<BridgeParams>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
            && self.candidates.is_empty()
            && self.burns.is_empty()
            && self.whitelist.is_empty()
            && self.burn_id_counter.is_none()
            && self.params.is_none()
    }

    /// Total number of individual writes.
    pub fn len(&self) -> usize {
        self.utxos.len()
            + self.candidates.len()
            + self.burns.len()
            + self.whitelist.len()
            + usize::from(self.burn_id_counter.is_some())
            + usize::from(self.params.is_some())
    }

    /// Fold `later` into this batch; later writes win.
    pub fn merge(&mut self, later: WriteBatch) {
        self.utxos.extend(later.utxos);
        self.candidates.extend(later.candidates);
        self.burns.extend(later.burns);
        self.whitelist.extend(later.whitelist);
        if later.burn_id_counter.is_some() {
            self.burn_id_counter = later.burn_id_counter;
        }
        if later.params.is_some() {
            self.params = later.params;
        }
    }

    /// The batch that restores `base` to its current contents after this
    /// batch has been committed to it.
    pub fn undo_against<S>(&self, base: &S) -> Result<WriteBatch, StoreError>
    where
        S: UtxoStore + CandidateStore + BurnStore + WhitelistStore + MetaStore + ?Sized,
    {
        let mut undo = WriteBatch::new();
        for key in self.utxos.keys() {
            undo.utxos.insert(key.clone(), base.get_utxo(key)?);
        }
        for key in self.candidates.keys() {
            undo.candidates.insert(key.clone(), base.get_candidates(key)?);
        }
        for id in self.burns.keys() {
            undo.burns.insert(*id, base.get_burn(*id)?);
        }
        for address in self.whitelist.keys() {
            undo.whitelist
                .insert(address.clone(), base.is_whitelisted(address)?);
        }
        if self.burn_id_counter.is_some() {
            undo.burn_id_counter = Some(base.burn_id_counter()?);
        }
        if self.params.is_some() {
            undo.params = Some(base.get_params()?);
        }
        Ok(undo)
    }

    /// Write every entry through the individual store methods.
    ///
    /// Backends call this from [`crate::LedgerStore::commit`] once they have
    /// established that the batch can be applied in full.
    pub fn apply_to<S>(self, store: &mut S) -> Result<(), StoreError>
    where
        S: UtxoStore + CandidateStore + BurnStore + WhitelistStore + MetaStore + ?Sized,
    {
        for (key, record) in self.utxos {
            match record {
                Some(record) => store.put_utxo(&key, &record)?,
                None => store.delete_utxo(&key)?,
            }
        }
        for (key, set) in self.candidates {
            match set {
                Some(set) => store.put_candidates(&key, &set)?,
                None => store.delete_candidates(&key)?,
            }
        }
        for (id, burn) in self.burns {
            match burn {
                Some(burn) => store.put_burn(&burn)?,
                None => store.delete_burn(id)?,
            }
        }
        for (address, listed) in self.whitelist {
            if listed {
                store.put_whitelisted(&address)?;
            } else {
                store.delete_whitelisted(&address)?;
            }
        }
        if let Some(next) = self.burn_id_counter {
            store.put_burn_id_counter(next)?;
        }
        if let Some(params) = self.params {
            store.put_params(&params)?;
        }
        Ok(())
    }
}
