//! Errors raised when decoding raw wire values into typed values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("unknown UTXO state code {0}")]
    UnknownUtxoState(u8),
}
