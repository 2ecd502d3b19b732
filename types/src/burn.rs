//! Burn requests: the redemption of custody tokens for external BTC.

use crate::address::Address;
use crate::utxo::UtxoKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Monotonic burn identifier. Never reused.
pub type BurnId = u64;

/// Lifecycle of a burn request: `Proposed → Confirmed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurnState {
    /// Amount escrowed in custody, no UTXOs attached yet.
    Proposed,
    /// UTXOs attached, fee fixed, tokens burned. Terminal.
    Confirmed,
}

impl fmt::Display for BurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposed => write!(f, "Proposed"),
            Self::Confirmed => write!(f, "Confirmed"),
        }
    }
}

/// A custody UTXO spent by a burn, with the signatures collected for it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedUtxo {
    pub amount: u128,
    /// Signer → opaque BTC transaction signature. Never validated here.
    pub signatures: BTreeMap<Address, Vec<u8>>,
}

impl AttachedUtxo {
    /// An unsigned entry, as a gatekeeper supplies it to `confirm_burn`.
    pub fn unsigned(amount: u128) -> Self {
        Self {
            amount,
            signatures: BTreeMap::new(),
        }
    }
}

/// A request to redeem custody tokens for BTC sent to an external address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRequest {
    pub id: BurnId,
    pub proposer: Address,
    /// External (BTC) address that receives the redeemed coins.
    pub receiver: String,
    /// Amount escrowed from the proposer.
    pub amount: u128,
    /// Total BTC network fee, fixed at confirmation.
    pub fee: u128,
    pub state: BurnState,
    pub attached_utxos: BTreeMap<UtxoKey, AttachedUtxo>,
}

impl BurnRequest {
    /// A freshly proposed burn with no fee and no UTXOs.
    pub fn proposed(id: BurnId, proposer: Address, receiver: String, amount: u128) -> Self {
        Self {
            id,
            proposer,
            receiver,
            amount,
            fee: 0,
            state: BurnState::Proposed,
            attached_utxos: BTreeMap::new(),
        }
    }

    pub fn is_proposed(&self) -> bool {
        self.state == BurnState::Proposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposed_burn_starts_empty() {
        let burn = BurnRequest::proposed(7, Address::new("tz1alice"), "bc1qxyz".into(), 900);
        assert!(burn.is_proposed());
        assert_eq!(burn.fee, 0);
        assert!(burn.attached_utxos.is_empty());
    }

    #[test]
    fn burn_state_display() {
        assert_eq!(BurnState::Proposed.to_string(), "Proposed");
        assert_eq!(BurnState::Confirmed.to_string(), "Confirmed");
    }
}
