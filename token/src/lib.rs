//! The token ledger the custody ledger mints into and burns from.
//!
//! The custody ledger never moves balances itself. Each successful call
//! ends with a list of [`TokenOperation`]s that the [`TokenLedger`]
//! executes as one unit.

pub mod error;
pub mod memory;
pub mod operation;

pub use error::TokenError;
pub use memory::MemoryToken;
pub use operation::{Entrypoint, TokenLedger, TokenOperation};
