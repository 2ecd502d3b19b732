//! Fundamental types for the custody bridge ledger.
//!
//! This crate defines the data model shared across every other crate in the
//! workspace: ledger addresses, external UTXO keys and records, observation
//! candidates, burn requests, and the admin-tunable bridge parameters.

pub mod address;
pub mod burn;
pub mod candidate;
pub mod error;
pub mod params;
pub mod utxo;

pub use address::Address;
pub use burn::{AttachedUtxo, BurnId, BurnRequest, BurnState};
pub use candidate::CandidateSet;
pub use error::TypesError;
pub use params::{BridgeParams, ParamUpdate};
pub use utxo::{CandidateKey, UtxoKey, UtxoRecord, UtxoState};
