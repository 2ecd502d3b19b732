//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use custody_roles::RoleRegistry;
use custody_types::{Address, BridgeParams};

use crate::LedgerError;

/// Configuration for a custody ledger instance.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The ledger's own account on the token ledger (custody escrow).
    #[serde(default = "default_self_address")]
    pub self_address: Address,

    /// Administrators at start-up. At least one is required.
    #[serde(default)]
    pub admins: Vec<Address>,

    #[serde(default)]
    pub gatekeepers: Vec<Address>,

    #[serde(default)]
    pub trusted_signers: Vec<Address>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bridge parameters the ledger starts with.
    #[serde(default)]
    pub params: ParamsSection,
}

/// The `[params]` table.
///
/// TOML integers are 64-bit, so amounts are read as `u64` and widened into
/// [`BridgeParams`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsSection {
    pub threshold: u32,
    pub service_fee: u64,
    pub min_burn_amount: u64,
    pub max_btc_network_fee: u64,
    pub max_utxo_per_tx_count: u32,
    pub treasury_address: Address,
    pub redeem_address: Address,
    #[serde(with = "hex::serde")]
    pub btc_gatekeeper_address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub custody_btc_address: Vec<u8>,
}

impl Default for ParamsSection {
    fn default() -> Self {
        let defaults = BridgeParams::default();
        Self {
            threshold: defaults.threshold,
            service_fee: BridgeParams::DEFAULT_SERVICE_FEE as u64,
            min_burn_amount: BridgeParams::DEFAULT_MIN_BURN_AMOUNT as u64,
            max_btc_network_fee: BridgeParams::DEFAULT_MAX_BTC_NETWORK_FEE as u64,
            max_utxo_per_tx_count: defaults.max_utxo_per_tx_count,
            treasury_address: defaults.treasury_address,
            redeem_address: defaults.redeem_address,
            btc_gatekeeper_address: defaults.btc_gatekeeper_address,
            custody_btc_address: defaults.custody_btc_address,
        }
    }
}

impl From<ParamsSection> for BridgeParams {
    fn from(section: ParamsSection) -> Self {
        Self {
            threshold: section.threshold,
            service_fee: u128::from(section.service_fee),
            min_burn_amount: u128::from(section.min_burn_amount),
            max_btc_network_fee: u128::from(section.max_btc_network_fee),
            max_utxo_per_tx_count: section.max_utxo_per_tx_count,
            treasury_address: section.treasury_address,
            redeem_address: section.redeem_address,
            btc_gatekeeper_address: section.btc_gatekeeper_address,
            custody_btc_address: section.custody_btc_address,
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_self_address() -> Address {
    Address::new("KT1CustodyLedger")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            self_address: default_self_address(),
            params: ParamsSection::default(),
            admins: Vec::new(),
            gatekeepers: Vec::new(),
            trusted_signers: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.admins.is_empty() {
            return Err(LedgerError::Config(
                "at least one administrator is required".to_string(),
            ));
        }
        if self.params.threshold == 0 {
            return Err(LedgerError::Config("threshold must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn bridge_params(&self) -> BridgeParams {
        self.params.clone().into()
    }

    /// The role registry described by this configuration.
    pub fn build_roles(&self) -> RoleRegistry {
        RoleRegistry::with_members(
            self.admins.iter().cloned(),
            self.gatekeepers.iter().cloned(),
            self.trusted_signers.iter().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_roles::AccessControl;
    use std::io::Write;

    const SAMPLE: &str = r#"
self_address = "KT1Ledger"
admins = ["tz1admin"]
gatekeepers = ["tz1gk"]
trusted_signers = ["tz1s1", "tz1s2"]
log_format = "json"

[params]
threshold = 2
service_fee = 50
treasury_address = "tz1treasury"
custody_btc_address = "0014abcd"
"#;

    #[test]
    fn parses_and_fills_defaults() {
        let cfg = LedgerConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.self_address, Address::new("KT1Ledger"));
        assert_eq!(cfg.params.threshold, 2);
        assert_eq!(cfg.params.service_fee, 50);
        let params = cfg.bridge_params();
        assert_eq!(params.service_fee, 50);
        assert_eq!(params.min_burn_amount, BridgeParams::DEFAULT_MIN_BURN_AMOUNT);
        assert_eq!(params.treasury_address, Address::new("tz1treasury"));
        assert_eq!(params.custody_btc_address, vec![0x00, 0x14, 0xab, 0xcd]);
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.log_level, "info");
        cfg.validate().unwrap();

        let roles = cfg.build_roles();
        assert!(roles.is_admin(&Address::new("tz1admin")));
        assert!(roles.is_gatekeeper(&Address::new("tz1gk")));
        assert!(roles.is_trusted_signer(&Address::new("tz1s2")));
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, LedgerConfig::default());
        assert_eq!(cfg.bridge_params(), BridgeParams::default());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = LedgerConfig::from_toml_str(SAMPLE).unwrap();
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(LedgerConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut cfg = LedgerConfig::from_toml_str(SAMPLE).unwrap();
        cfg.params.threshold = 0;
        assert_eq!(cfg.validate().unwrap_err().tag(), "ConfigError");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cfg = LedgerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(cfg.trusted_signers.len(), 2);

        let err = LedgerConfig::from_toml_file("/nonexistent/custody.toml").unwrap_err();
        assert_eq!(err.tag(), "ConfigError");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = LedgerConfig::from_toml_str("params = 3").unwrap_err();
        assert_eq!(err.tag(), "ConfigError");
    }
}
