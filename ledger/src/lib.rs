//! Custody bridge ledger.
//!
//! Reconciles Bitcoin UTXOs held in custody with mint and burn actions on a
//! token ledger. No single party can mint, burn or confirm a custody event
//! on its own:
//!
//! - Trusted signers report deposits and change outputs; a report becomes a
//!   fact once `threshold` signers agree on identical content.
//! - Gatekeepers mint confirmed deposits and confirm burns against spendable
//!   custody UTXOs.
//! - Verified users propose burns, escrowing the amount with the ledger.
//! - Administrators tune parameters and hold an override path for UTXOs.
//!
//! Every entrypoint is all-or-nothing: a failure leaves the store and the
//! token ledger as they were.
//!
//! ## Module overview
//!
//! - [`engine`]: [`BridgeLedger`], call execution, overrides and queries.
//! - [`observe`]: `confirm_utxo` and `confirm_change_utxo`.
//! - [`mint`]: the mint dispatcher.
//! - [`burn`]: the burn lifecycle.
//! - [`config`]: TOML configuration.
//! - [`snapshot`]: hashed state snapshots.

pub mod burn;
pub mod config;
pub mod engine;
pub mod error;
pub mod mint;
pub mod observe;
pub mod receipt;
pub mod snapshot;

pub use burn::BurnSignature;
pub use config::{LedgerConfig, ParamsSection};
pub use engine::BridgeLedger;
pub use error::{ErrorKind, LedgerError};
pub use observe::ChangeOutput;
pub use receipt::{Callback, Receipt};
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
