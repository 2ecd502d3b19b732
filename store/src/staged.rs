//! Copy-on-write overlay used to run one ledger call all-or-nothing.
//!
//! Reads fall through to the committed base unless the call has already
//! written the key; writes only touch the overlay. Dropping the overlay
//! discards the call, [`StagedStore::into_batch`] hands its writes over
//! for commit.

use crate::{
    BurnStore, CandidateStore, LedgerStore, MetaStore, StoreError, UtxoStore, WhitelistStore,
    WriteBatch,
};
use custody_types::{Address, BridgeParams, BurnId, BurnRequest, CandidateSet, UtxoKey, UtxoRecord};
use std::collections::BTreeMap;

pub struct StagedStore<'a, S: LedgerStore + ?Sized> {
    base: &'a S,
    batch: WriteBatch,
}

impl<'a, S: LedgerStore + ?Sized> StagedStore<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            batch: WriteBatch::new(),
        }
    }

    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }
}

/// Overlay staged entries on top of an ordered base listing.
fn overlay<K: Ord + Clone, V: Clone>(
    base: Vec<(K, V)>,
    staged: &BTreeMap<K, Option<V>>,
) -> Vec<(K, V)> {
    let mut merged: BTreeMap<K, V> = base.into_iter().collect();
    for (key, value) in staged {
        match value {
            Some(v) => {
                merged.insert(key.clone(), v.clone());
            }
            None => {
                merged.remove(key);
            }
        }
    }
    merged.into_iter().collect()
}

impl<S: LedgerStore + ?Sized> UtxoStore for StagedStore<'_, S> {
    fn get_utxo(&self, key: &UtxoKey) -> Result<Option<UtxoRecord>, StoreError> {
        match self.batch.utxos.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.base.get_utxo(key),
        }
    }

    fn put_utxo(&mut self, key: &UtxoKey, record: &UtxoRecord) -> Result<(), StoreError> {
        self.batch.utxos.insert(key.clone(), Some(record.clone()));
        Ok(())
    }

    fn delete_utxo(&mut self, key: &UtxoKey) -> Result<(), StoreError> {
        self.batch.utxos.insert(key.clone(), None);
        Ok(())
    }

    fn iter_utxos(&self) -> Result<Vec<(UtxoKey, UtxoRecord)>, StoreError> {
        Ok(overlay(self.base.iter_utxos()?, &self.batch.utxos))
    }
}

impl<S: LedgerStore + ?Sized> CandidateStore for StagedStore<'_, S> {
    fn get_candidates(&self, key: &UtxoKey) -> Result<Option<CandidateSet>, StoreError> {
        match self.batch.candidates.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.base.get_candidates(key),
        }
    }

    fn put_candidates(&mut self, key: &UtxoKey, set: &CandidateSet) -> Result<(), StoreError> {
        self.batch.candidates.insert(key.clone(), Some(set.clone()));
        Ok(())
    }

    fn delete_candidates(&mut self, key: &UtxoKey) -> Result<(), StoreError> {
        self.batch.candidates.insert(key.clone(), None);
        Ok(())
    }

    fn iter_candidates(&self) -> Result<Vec<(UtxoKey, CandidateSet)>, StoreError> {
        Ok(overlay(self.base.iter_candidates()?, &self.batch.candidates))
    }
}

impl<S: LedgerStore + ?Sized> BurnStore for StagedStore<'_, S> {
    fn get_burn(&self, id: BurnId) -> Result<Option<BurnRequest>, StoreError> {
        match self.batch.burns.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => self.base.get_burn(id),
        }
    }

    fn put_burn(&mut self, burn: &BurnRequest) -> Result<(), StoreError> {
        self.batch.burns.insert(burn.id, Some(burn.clone()));
        Ok(())
    }

    fn delete_burn(&mut self, id: BurnId) -> Result<(), StoreError> {
        self.batch.burns.insert(id, None);
        Ok(())
    }

    fn iter_burns(&self) -> Result<Vec<BurnRequest>, StoreError> {
        let base = self
            .base
            .iter_burns()?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        Ok(overlay(base, &self.batch.burns)
            .into_iter()
            .map(|(_, b)| b)
            .collect())
    }

    fn burn_id_counter(&self) -> Result<BurnId, StoreError> {
        match self.batch.burn_id_counter {
            Some(next) => Ok(next),
            None => self.base.burn_id_counter(),
        }
    }

    fn put_burn_id_counter(&mut self, next: BurnId) -> Result<(), StoreError> {
        self.batch.burn_id_counter = Some(next);
        Ok(())
    }
}

impl<S: LedgerStore + ?Sized> WhitelistStore for StagedStore<'_, S> {
    fn is_whitelisted(&self, address: &Address) -> Result<bool, StoreError> {
        match self.batch.whitelist.get(address) {
            Some(listed) => Ok(*listed),
            None => self.base.is_whitelisted(address),
        }
    }

    fn put_whitelisted(&mut self, address: &Address) -> Result<(), StoreError> {
        self.batch.whitelist.insert(address.clone(), true);
        Ok(())
    }

    fn delete_whitelisted(&mut self, address: &Address) -> Result<(), StoreError> {
        self.batch.whitelist.insert(address.clone(), false);
        Ok(())
    }

    fn iter_whitelisted(&self) -> Result<Vec<Address>, StoreError> {
        let mut listed: Vec<Address> = self
            .base
            .iter_whitelisted()?
            .into_iter()
            .filter(|a| self.batch.whitelist.get(a) != Some(&false))
            .collect();
        for (address, added) in &self.batch.whitelist {
            if *added && !listed.contains(address) {
                listed.push(address.clone());
            }
        }
        listed.sort();
        Ok(listed)
    }
}

impl<S: LedgerStore + ?Sized> MetaStore for StagedStore<'_, S> {
    fn get_params(&self) -> Result<BridgeParams, StoreError> {
        match &self.batch.params {
            Some(params) => Ok(params.clone()),
            None => self.base.get_params(),
        }
    }

    fn put_params(&mut self, params: &BridgeParams) -> Result<(), StoreError> {
        self.batch.params = Some(params.clone());
        Ok(())
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for StagedStore<'_, S> {
    /// Nested staging: fold the inner batch into this overlay.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        self.batch.merge(batch);
        Ok(())
    }
}
