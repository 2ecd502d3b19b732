//! Nullable store: in-memory storage for the five ledger maps.

use custody_store::{
    BurnStore, CandidateStore, LedgerStore, MetaStore, StoreError, UtxoStore, WhitelistStore,
    WriteBatch,
};
use custody_types::{Address, BridgeParams, BurnId, BurnRequest, CandidateSet, UtxoKey, UtxoRecord};
use std::collections::{BTreeMap, BTreeSet};

/// An in-memory ledger store for tests and tools.
#[derive(Clone, Debug, Default)]
pub struct NullStore {
    utxos: BTreeMap<UtxoKey, UtxoRecord>,
    candidates: BTreeMap<UtxoKey, CandidateSet>,
    burns: BTreeMap<BurnId, BurnRequest>,
    whitelist: BTreeSet<Address>,
    burn_id_counter: BurnId,
    params: BridgeParams,
    reject_commits: bool,
    commits: u64,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: BridgeParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Make every subsequent [`LedgerStore::commit`] fail with a backend error.
    pub fn reject_commits(&mut self, reject: bool) {
        self.reject_commits = reject;
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    pub fn pending_candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn burn_count(&self) -> usize {
        self.burns.len()
    }
}

impl UtxoStore for NullStore {
    fn get_utxo(&self, key: &UtxoKey) -> Result<Option<UtxoRecord>, StoreError> {
        Ok(self.utxos.get(key).cloned())
    }

    fn put_utxo(&mut self, key: &UtxoKey, record: &UtxoRecord) -> Result<(), StoreError> {
        self.utxos.insert(key.clone(), record.clone());
        Ok(())
    }

    fn delete_utxo(&mut self, key: &UtxoKey) -> Result<(), StoreError> {
        self.utxos.remove(key);
        Ok(())
    }

    fn iter_utxos(&self) -> Result<Vec<(UtxoKey, UtxoRecord)>, StoreError> {
        Ok(self
            .utxos
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl CandidateStore for NullStore {
    fn get_candidates(&self, key: &UtxoKey) -> Result<Option<CandidateSet>, StoreError> {
        Ok(self.candidates.get(key).cloned())
    }

    fn put_candidates(&mut self, key: &UtxoKey, set: &CandidateSet) -> Result<(), StoreError> {
        self.candidates.insert(key.clone(), set.clone());
        Ok(())
    }

    fn delete_candidates(&mut self, key: &UtxoKey) -> Result<(), StoreError> {
        self.candidates.remove(key);
        Ok(())
    }

    fn iter_candidates(&self) -> Result<Vec<(UtxoKey, CandidateSet)>, StoreError> {
        Ok(self
            .candidates
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl BurnStore for NullStore {
    fn get_burn(&self, id: BurnId) -> Result<Option<BurnRequest>, StoreError> {
        Ok(self.burns.get(&id).cloned())
    }

    fn put_burn(&mut self, burn: &BurnRequest) -> Result<(), StoreError> {
        self.burns.insert(burn.id, burn.clone());
        Ok(())
    }

    fn delete_burn(&mut self, id: BurnId) -> Result<(), StoreError> {
        self.burns.remove(&id);
        Ok(())
    }

    fn iter_burns(&self) -> Result<Vec<BurnRequest>, StoreError> {
        Ok(self.burns.values().cloned().collect())
    }

    fn burn_id_counter(&self) -> Result<BurnId, StoreError> {
        Ok(self.burn_id_counter)
    }

    fn put_burn_id_counter(&mut self, next: BurnId) -> Result<(), StoreError> {
        self.burn_id_counter = next;
        Ok(())
    }
}

impl WhitelistStore for NullStore {
    fn is_whitelisted(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.whitelist.contains(address))
    }

    fn put_whitelisted(&mut self, address: &Address) -> Result<(), StoreError> {
        self.whitelist.insert(address.clone());
        Ok(())
    }

    fn delete_whitelisted(&mut self, address: &Address) -> Result<(), StoreError> {
        self.whitelist.remove(address);
        Ok(())
    }

    fn iter_whitelisted(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self.whitelist.iter().cloned().collect())
    }
}

impl MetaStore for NullStore {
    fn get_params(&self) -> Result<BridgeParams, StoreError> {
        Ok(self.params.clone())
    }

    fn put_params(&mut self, params: &BridgeParams) -> Result<(), StoreError> {
        self.params = params.clone();
        Ok(())
    }
}

impl LedgerStore for NullStore {
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.reject_commits {
            return Err(StoreError::Backend("commits are rejected".to_string()));
        }
        // In-memory writes cannot fail, so applying in sequence is atomic.
        batch.apply_to(self)?;
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_store::StagedStore;
    use custody_types::{CandidateKey, UtxoState};

    fn key(n: u8) -> UtxoKey {
        UtxoKey::new(vec![n; 4], 0)
    }

    fn record(amount: u128) -> UtxoRecord {
        UtxoRecord {
            state: UtxoState::Initial,
            receiver: Some(Address::new("tz1bob")),
            amount,
        }
    }

    #[test]
    fn put_get_delete_utxo() {
        let mut store = NullStore::new();
        store.put_utxo(&key(1), &record(10)).unwrap();
        assert_eq!(store.get_utxo(&key(1)).unwrap(), Some(record(10)));
        assert!(store.contains_utxo(&key(1)).unwrap());
        store.delete_utxo(&key(1)).unwrap();
        assert!(!store.contains_utxo(&key(1)).unwrap());
        // Deleting twice is a no-op.
        store.delete_utxo(&key(1)).unwrap();
    }

    #[test]
    fn staged_reads_see_own_writes_but_base_is_untouched() {
        let mut base = NullStore::new();
        base.put_utxo(&key(1), &record(10)).unwrap();

        let mut staged = StagedStore::new(&base);
        staged.delete_utxo(&key(1)).unwrap();
        staged.put_utxo(&key(2), &record(20)).unwrap();
        staged.put_whitelisted(&Address::new("tz1alice")).unwrap();
        staged.put_burn_id_counter(5).unwrap();

        assert!(!staged.contains_utxo(&key(1)).unwrap());
        assert_eq!(staged.get_utxo(&key(2)).unwrap(), Some(record(20)));
        assert_eq!(staged.iter_utxos().unwrap().len(), 1);
        assert!(staged.is_whitelisted(&Address::new("tz1alice")).unwrap());
        assert_eq!(staged.burn_id_counter().unwrap(), 5);

        assert!(base.contains_utxo(&key(1)).unwrap());
        assert!(!base.contains_utxo(&key(2)).unwrap());
        assert_eq!(base.burn_id_counter().unwrap(), 0);
    }

    #[test]
    fn dropped_overlay_discards_writes() {
        let base = NullStore::new();
        {
            let mut staged = StagedStore::new(&base);
            staged.put_utxo(&key(1), &record(10)).unwrap();
        }
        assert_eq!(base.utxo_count(), 0);
    }

    #[test]
    fn commit_applies_batch_and_undo_restores() {
        let mut base = NullStore::new();
        base.put_utxo(&key(1), &record(10)).unwrap();

        let batch = {
            let mut staged = StagedStore::new(&base);
            staged.delete_utxo(&key(1)).unwrap();
            let mut set = CandidateSet::new();
            set.record_vote(Address::new("tz1s1"), CandidateKey::change(7));
            staged.put_candidates(&key(2), &set).unwrap();
            staged.into_batch()
        };
        let undo = batch.undo_against(&base).unwrap();

        base.commit(batch).unwrap();
        assert_eq!(base.utxo_count(), 0);
        assert_eq!(base.pending_candidate_count(), 1);

        base.commit(undo).unwrap();
        assert_eq!(base.get_utxo(&key(1)).unwrap(), Some(record(10)));
        assert_eq!(base.pending_candidate_count(), 0);
        assert_eq!(base.commit_count(), 2);
    }

    #[test]
    fn rejected_commit_leaves_store_unchanged() {
        let mut base = NullStore::new();
        base.reject_commits(true);
        let mut batch = WriteBatch::new();
        batch.utxos.insert(key(1), Some(record(1)));
        assert!(base.commit(batch).is_err());
        assert_eq!(base.utxo_count(), 0);
        assert_eq!(base.commit_count(), 0);
    }

    #[test]
    fn whitelist_overlay_listing() {
        let mut base = NullStore::new();
        base.put_whitelisted(&Address::new("tz1a")).unwrap();
        base.put_whitelisted(&Address::new("tz1b")).unwrap();

        let mut staged = StagedStore::new(&base);
        staged.delete_whitelisted(&Address::new("tz1a")).unwrap();
        staged.put_whitelisted(&Address::new("tz1c")).unwrap();
        assert_eq!(
            staged.iter_whitelisted().unwrap(),
            vec![Address::new("tz1b"), Address::new("tz1c")]
        );
    }
}
