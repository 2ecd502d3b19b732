//! Bridge parameters: the admin-tunable scalars the ledger algorithms consume.
//!
//! None of these values are part of the consensus state; they are read at
//! the start of every call and may be changed between calls by an admin.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// All admin-mutable configuration of the custody ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeParams {
    // ── Observation consensus ────────────────────────────────────────────
    /// Number of distinct trusted signers that must agree on a UTXO.
    pub threshold: u32,

    // ── Fees and limits ──────────────────────────────────────────────────
    /// Amount retained by the treasury on every mint and burn.
    pub service_fee: u128,
    /// Smallest amount a verified user may propose to burn.
    pub min_burn_amount: u128,
    /// Upper bound on the total BTC network fee of a confirmed burn.
    pub max_btc_network_fee: u128,
    /// A burn must attach strictly fewer UTXOs than this.
    pub max_utxo_per_tx_count: u32,

    // ── Accounts ─────────────────────────────────────────────────────────
    /// Receives the service fee of every mint and burn.
    pub treasury_address: Address,
    /// Token-ledger account whose balance `burn` destroys.
    pub redeem_address: Address,
    /// BTC script the gatekeeper withdraws to.
    #[serde(with = "hex::serde")]
    pub btc_gatekeeper_address: Vec<u8>,
    /// BTC script holding custody funds.
    #[serde(with = "hex::serde")]
    pub custody_btc_address: Vec<u8>,
}

impl BridgeParams {
    pub const DEFAULT_THRESHOLD: u32 = 3;
    pub const DEFAULT_SERVICE_FEE: u128 = 100;
    pub const DEFAULT_MIN_BURN_AMOUNT: u128 = 100;
    pub const DEFAULT_MAX_BTC_NETWORK_FEE: u128 = 1_000_000;
    pub const DEFAULT_MAX_UTXO_PER_TX_COUNT: u32 = 20;
    pub const PLACEHOLDER_ADDRESS: &'static str = "KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn";

    /// Apply one parameter change.
    pub fn apply(&mut self, update: ParamUpdate) {
        match update {
            ParamUpdate::Threshold(v) => self.threshold = v,
            ParamUpdate::ServiceFee(v) => self.service_fee = v,
            ParamUpdate::MinBurnAmount(v) => self.min_burn_amount = v,
            ParamUpdate::MaxBtcNetworkFee(v) => self.max_btc_network_fee = v,
            ParamUpdate::MaxUtxoPerTxCount(v) => self.max_utxo_per_tx_count = v,
            ParamUpdate::TreasuryAddress(v) => self.treasury_address = v,
            ParamUpdate::RedeemAddress(v) => self.redeem_address = v,
            ParamUpdate::GatekeeperBtcAddress(v) => self.btc_gatekeeper_address = v,
            ParamUpdate::CustodyBtcAddress(v) => self.custody_btc_address = v,
        }
    }
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            service_fee: Self::DEFAULT_SERVICE_FEE,
            min_burn_amount: Self::DEFAULT_MIN_BURN_AMOUNT,
            max_btc_network_fee: Self::DEFAULT_MAX_BTC_NETWORK_FEE,
            max_utxo_per_tx_count: Self::DEFAULT_MAX_UTXO_PER_TX_COUNT,
            treasury_address: Address::new(Self::PLACEHOLDER_ADDRESS),
            redeem_address: Address::new(Self::PLACEHOLDER_ADDRESS),
            btc_gatekeeper_address: vec![0xff],
            custody_btc_address: vec![0xff],
        }
    }
}

/// A single admin parameter change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "param", content = "value")]
pub enum ParamUpdate {
    Threshold(u32),
    ServiceFee(u128),
    MinBurnAmount(u128),
    MaxBtcNetworkFee(u128),
    MaxUtxoPerTxCount(u32),
    TreasuryAddress(Address),
    RedeemAddress(Address),
    GatekeeperBtcAddress(#[serde(with = "hex::serde")] Vec<u8>),
    CustodyBtcAddress(#[serde(with = "hex::serde")] Vec<u8>),
}

impl ParamUpdate {
    /// Human-readable name of the parameter being changed.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Threshold(_) => "threshold",
            Self::ServiceFee(_) => "service_fee",
            Self::MinBurnAmount(_) => "min_burn_amount",
            Self::MaxBtcNetworkFee(_) => "max_btc_network_fee",
            Self::MaxUtxoPerTxCount(_) => "max_utxo_per_tx_count",
            Self::TreasuryAddress(_) => "treasury_address",
            Self::RedeemAddress(_) => "redeem_address",
            Self::GatekeeperBtcAddress(_) => "btc_gatekeeper_address",
            Self::CustodyBtcAddress(_) => "custody_btc_address",
        }
    }
}
