//! Abstract storage traits for the custody bridge ledger.
//!
//! The ledger persists five primary maps and nothing else: confirmed UTXOs,
//! pending observation candidates, burn requests, the verified-user
//! whitelist, and the configuration scalars (with the burn id counter).
//! Every backend implements these traits; the engine depends only on them.
//!
//! Writes for one call are staged in a [`StagedStore`] and reach the backend
//! as a single [`WriteBatch`] through [`LedgerStore::commit`].

pub mod batch;
pub mod burn;
pub mod candidate;
pub mod error;
pub mod meta;
pub mod staged;
pub mod utxo;
pub mod whitelist;

pub use batch::WriteBatch;
pub use burn::BurnStore;
pub use candidate::CandidateStore;
pub use error::StoreError;
pub use meta::MetaStore;
pub use staged::StagedStore;
pub use utxo::UtxoStore;
pub use whitelist::WhitelistStore;

/// A complete ledger backend: all five maps plus atomic batch commit.
pub trait LedgerStore: UtxoStore + CandidateStore + BurnStore + WhitelistStore + MetaStore {
    /// Apply every write in `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError>;
}
