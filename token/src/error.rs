//! Token-ledger errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token ledger has no {0} entrypoint")]
    MissingEntrypoint(&'static str),

    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("token supply overflow")]
    Overflow,
}
