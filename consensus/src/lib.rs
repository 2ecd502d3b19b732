//! Observation consensus: turning independent signer reports into facts.
//!
//! Trusted signers watch the external chain and report what they see about
//! a UTXO: who should receive the minted tokens (for deposits) and how much
//! the output holds. Reports arrive in any order and may conflict.
//!
//! - Each signer votes at most once per UTXO key, whatever content it reports.
//! - Votes for identical content accumulate in one candidate bucket.
//! - The first candidate to reach the threshold is promoted into the UTXO
//!   store and every other pending vote for that key is discarded.
//!
//! ## Module overview
//!
//! - [`observation`]: the engine and its two modes (deposit, change).
//! - [`error`]: consensus error types.

pub mod error;
pub mod observation;

pub use error::ConsensusError;
pub use observation::{ObservationConsensus, ObservationMode, ObservationOutcome};
