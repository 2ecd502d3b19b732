//! Ledger snapshots: the five primary maps and the burn counter at a point
//! in time.
//!
//! A snapshot carries a Blake2b-256 hash over its contents so an operator
//! can check integrity before restoring it into a fresh store.

use crate::error::LedgerError;
use custody_store::{LedgerStore, WriteBatch};
use custody_types::{Address, BridgeParams, BurnId, BurnRequest, CandidateSet, UtxoKey, UtxoRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of every other field.
    pub hash: [u8; 32],
    pub version: u32,
    pub utxos: Vec<(UtxoKey, UtxoRecord)>,
    pub candidates: Vec<(UtxoKey, CandidateSet)>,
    pub burns: Vec<BurnRequest>,
    pub whitelist: Vec<Address>,
    pub burn_id_counter: BurnId,
    pub params: BridgeParams,
}

/// Borrowed view of the hashed fields, in a fixed order.
#[derive(Serialize)]
struct HashedBody<'a> {
    version: u32,
    utxos: &'a [(UtxoKey, UtxoRecord)],
    candidates: &'a [(UtxoKey, CandidateSet)],
    burns: &'a [BurnRequest],
    whitelist: &'a [Address],
    burn_id_counter: BurnId,
    params: &'a BridgeParams,
}

impl LedgerSnapshot {
    /// Capture the committed contents of `store`.
    pub fn capture<S: LedgerStore + ?Sized>(store: &S) -> Result<Self, LedgerError> {
        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            utxos: store.iter_utxos()?,
            candidates: store.iter_candidates()?,
            burns: store.iter_burns()?,
            whitelist: store.iter_whitelisted()?,
            burn_id_counter: store.burn_id_counter()?,
            params: store.get_params()?,
        };
        snap.hash = snap.compute_hash()?;
        Ok(snap)
    }

    fn compute_hash(&self) -> Result<[u8; 32], LedgerError> {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let body = HashedBody {
            version: self.version,
            utxos: &self.utxos,
            candidates: &self.candidates,
            burns: &self.burns,
            whitelist: &self.whitelist,
            burn_id_counter: self.burn_id_counter,
            params: &self.params,
        };
        let encoded =
            bincode::serialize(&body).map_err(|e| LedgerError::Snapshot(e.to_string()))?;

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&encoded);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Ok(out)
    }

    /// Whether the stored hash matches the contents.
    pub fn verify(&self) -> bool {
        self.version == SNAPSHOT_VERSION
            && self.compute_hash().map(|h| h == self.hash).unwrap_or(false)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// The batch that makes `store` hold exactly this snapshot: every entry
    /// of the snapshot is written and everything else is deleted.
    pub fn restore_batch<S: LedgerStore + ?Sized>(&self, store: &S) -> Result<WriteBatch, LedgerError> {
        let mut batch = WriteBatch::new();

        for (key, _) in store.iter_utxos()? {
            batch.utxos.insert(key, None);
        }
        for (key, record) in &self.utxos {
            batch.utxos.insert(key.clone(), Some(record.clone()));
        }

        for (key, _) in store.iter_candidates()? {
            batch.candidates.insert(key, None);
        }
        for (key, set) in &self.candidates {
            batch.candidates.insert(key.clone(), Some(set.clone()));
        }

        for burn in store.iter_burns()? {
            batch.burns.insert(burn.id, None);
        }
        for burn in &self.burns {
            batch.burns.insert(burn.id, Some(burn.clone()));
        }

        let listed: BTreeSet<&Address> = self.whitelist.iter().collect();
        for address in store.iter_whitelisted()? {
            if !listed.contains(&address) {
                batch.whitelist.insert(address, false);
            }
        }
        for address in &self.whitelist {
            batch.whitelist.insert(address.clone(), true);
        }

        batch.burn_id_counter = Some(self.burn_id_counter);
        batch.params = Some(self.params.clone());
        Ok(batch)
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    pub fn burn_count(&self) -> usize {
        self.burns.len()
    }
}
