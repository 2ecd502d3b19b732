//! UTXO Store: confirmed external UTXOs and their spendable state.

use crate::StoreError;
use custody_types::{UtxoKey, UtxoRecord};

/// Trait for the authoritative `UtxoKey → UtxoRecord` map.
pub trait UtxoStore {
    fn get_utxo(&self, key: &UtxoKey) -> Result<Option<UtxoRecord>, StoreError>;
    fn put_utxo(&mut self, key: &UtxoKey, record: &UtxoRecord) -> Result<(), StoreError>;

    /// Delete a UTXO. Deleting an absent key is not an error.
    fn delete_utxo(&mut self, key: &UtxoKey) -> Result<(), StoreError>;

    /// All confirmed UTXOs ordered by key.
    fn iter_utxos(&self) -> Result<Vec<(UtxoKey, UtxoRecord)>, StoreError>;

    fn contains_utxo(&self, key: &UtxoKey) -> Result<bool, StoreError> {
        self.get_utxo(key).map(|r| r.is_some())
    }
}
