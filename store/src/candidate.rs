//! Pending observation candidates, one set per unconfirmed UTXO key.

use crate::StoreError;
use custody_types::{CandidateSet, UtxoKey};

pub trait CandidateStore {
    fn get_candidates(&self, key: &UtxoKey) -> Result<Option<CandidateSet>, StoreError>;
    fn put_candidates(&mut self, key: &UtxoKey, set: &CandidateSet) -> Result<(), StoreError>;
    fn delete_candidates(&mut self, key: &UtxoKey) -> Result<(), StoreError>;
    fn iter_candidates(&self) -> Result<Vec<(UtxoKey, CandidateSet)>, StoreError>;
}
