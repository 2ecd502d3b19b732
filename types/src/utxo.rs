//! External UTXO identifiers and the records the ledger keeps about them.

use crate::address::Address;
use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique identifier of an external (Bitcoin) unspent output.
///
/// Never mutated; used as a map key throughout the ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtxoKey {
    /// Transaction id of the output, raw bytes.
    #[serde(with = "hex::serde")]
    pub txid: Vec<u8>,
    /// Output index within the transaction.
    pub output_index: u32,
}

impl UtxoKey {
    pub fn new(txid: impl Into<Vec<u8>>, output_index: u32) -> Self {
        Self {
            txid: txid.into(),
            output_index,
        }
    }
}

impl fmt::Display for UtxoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(&self.txid), self.output_index)
    }
}

/// Spendability of a confirmed UTXO.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtxoState {
    /// Confirmed deposit that has not been minted yet.
    Initial,
    /// Already minted (or a change output): no longer mintable, spendable by a burn.
    SpentForMint,
}

impl UtxoState {
    /// Wire code of this state (`0` = Initial, `1` = SpentForMint).
    pub fn code(self) -> u8 {
        match self {
            Self::Initial => 0,
            Self::SpentForMint => 1,
        }
    }

    /// Whether a mint may consume a UTXO in this state.
    pub fn is_mintable(self) -> bool {
        self == Self::Initial
    }

    /// Whether a burn may attach a UTXO in this state.
    pub fn is_spendable(self) -> bool {
        self == Self::SpentForMint
    }
}

impl TryFrom<u8> for UtxoState {
    type Error = TypesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Initial),
            1 => Ok(Self::SpentForMint),
            other => Err(TypesError::UnknownUtxoState(other)),
        }
    }
}

impl fmt::Display for UtxoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "Initial"),
            Self::SpentForMint => write!(f, "SpentForMint"),
        }
    }
}

/// Binding state of a confirmed UTXO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub state: UtxoState,
    /// Ledger address entitled to the minted tokens. `None` for change outputs.
    pub receiver: Option<Address>,
    /// Output value in satoshis.
    pub amount: u128,
}

/// The content a trusted signer claims for a UTXO.
///
/// Two reports agree only if they are equal field for field.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateKey {
    pub receiver: Option<Address>,
    pub amount: u128,
}

impl CandidateKey {
    /// Candidate for a user deposit that should be minted to `receiver`.
    pub fn deposit(receiver: Address, amount: u128) -> Self {
        Self {
            receiver: Some(receiver),
            amount,
        }
    }

    /// Candidate for a change output returning to custody.
    pub fn change(amount: u128) -> Self {
        Self {
            receiver: None,
            amount,
        }
    }

    /// The record this candidate becomes once promoted into `state`.
    pub fn into_record(self, state: UtxoState) -> UtxoRecord {
        UtxoRecord {
            state,
            receiver: self.receiver,
            amount: self.amount,
        }
    }
}
