//! Token operations and the collaborator trait that executes them.

use crate::error::TokenError;
use custody_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three token-ledger entrypoints the custody ledger calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entrypoint {
    Transfer,
    Mint,
    Burn,
}

impl Entrypoint {
    pub const ALL: [Entrypoint; 3] = [Self::Transfer, Self::Mint, Self::Burn];

    pub fn name(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Mint => "mint",
            Self::Burn => "burn",
        }
    }
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One call into the token ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum TokenOperation {
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    Mint {
        to: Address,
        amount: u128,
    },
    /// Destroys `amount` from the token ledger's redeem account.
    Burn { amount: u128 },
}

impl TokenOperation {
    pub fn entrypoint(&self) -> Entrypoint {
        match self {
            Self::Transfer { .. } => Entrypoint::Transfer,
            Self::Mint { .. } => Entrypoint::Mint,
            Self::Burn { .. } => Entrypoint::Burn,
        }
    }

    pub fn amount(&self) -> u128 {
        match self {
            Self::Transfer { amount, .. } | Self::Mint { amount, .. } | Self::Burn { amount } => {
                *amount
            }
        }
    }
}

/// The external token ledger.
pub trait TokenLedger {
    /// Whether the ledger exposes `entrypoint`.
    fn has_entrypoint(&self, entrypoint: Entrypoint) -> bool;

    /// Execute `ops` in order. Either every operation takes effect or none
    /// does.
    fn execute(&mut self, ops: &[TokenOperation]) -> Result<(), TokenError>;
}
