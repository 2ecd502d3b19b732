//! JSON call scripts replayed against an in-memory ledger.
//!
//! A script funds token accounts and then lists calls in order:
//!
//! ```json
//! {
//!   "balances": { "tz1alice": 5000 },
//!   "calls": [
//!     { "caller": "tz1gk", "action": "verify_address", "address": "tz1alice", "verified": true },
//!     { "caller": "tz1alice", "action": "propose_burn", "amount": 1000, "receiver": "bc1q..." }
//!   ]
//! }
//! ```
//!
//! A failing call is reported and the replay continues with the next one;
//! the failed call leaves no trace in the ledger.
//!
//! Calls are tagged by `action` and flattened next to `caller`, so serde
//! buffers them before decoding; that buffer has no 128-bit integers.
//! Amounts are therefore read as `u64` and widened for the ledger.

use std::collections::BTreeMap;

use custody_consensus::ObservationOutcome;
use custody_ledger::{BridgeLedger, BurnSignature, ChangeOutput, LedgerError, Receipt};
use custody_nullables::NullStore;
use custody_roles::RoleRegistry;
use custody_token::MemoryToken;
use custody_types::{Address, AttachedUtxo, BurnId, ParamUpdate, UtxoKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub type SimLedger = BridgeLedger<NullStore, RoleRegistry, MemoryToken>;

#[derive(Clone, Debug, Deserialize)]
pub struct Script {
    /// Token balances credited before the first call.
    #[serde(default)]
    pub balances: BTreeMap<Address, u64>,
    pub calls: Vec<ScriptCall>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScriptCall {
    pub caller: Address,
    #[serde(flatten)]
    pub action: Action,
}

/// A UTXO and its amount: a reported change output, or an entry a
/// gatekeeper attaches to a burn.
#[derive(Clone, Debug, Deserialize)]
pub struct UtxoEntry {
    pub key: UtxoKey,
    pub amount: u64,
}

impl From<&UtxoEntry> for ChangeOutput {
    fn from(entry: &UtxoEntry) -> Self {
        Self {
            key: entry.key.clone(),
            amount: u128::from(entry.amount),
        }
    }
}

/// A parameter change as written in a script.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "param", content = "value")]
pub enum ParamChange {
    Threshold(u32),
    ServiceFee(u64),
    MinBurnAmount(u64),
    MaxBtcNetworkFee(u64),
    MaxUtxoPerTxCount(u32),
    TreasuryAddress(Address),
    RedeemAddress(Address),
    GatekeeperBtcAddress(#[serde(with = "hex::serde")] Vec<u8>),
    CustodyBtcAddress(#[serde(with = "hex::serde")] Vec<u8>),
}

impl From<ParamChange> for ParamUpdate {
    fn from(change: ParamChange) -> Self {
        match change {
            ParamChange::Threshold(v) => Self::Threshold(v),
            ParamChange::ServiceFee(v) => Self::ServiceFee(u128::from(v)),
            ParamChange::MinBurnAmount(v) => Self::MinBurnAmount(u128::from(v)),
            ParamChange::MaxBtcNetworkFee(v) => Self::MaxBtcNetworkFee(u128::from(v)),
            ParamChange::MaxUtxoPerTxCount(v) => Self::MaxUtxoPerTxCount(v),
            ParamChange::TreasuryAddress(v) => Self::TreasuryAddress(v),
            ParamChange::RedeemAddress(v) => Self::RedeemAddress(v),
            ParamChange::GatekeeperBtcAddress(v) => Self::GatekeeperBtcAddress(v),
            ParamChange::CustodyBtcAddress(v) => Self::CustodyBtcAddress(v),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ConfirmUtxo {
        key: UtxoKey,
        receiver: Address,
        amount: u64,
    },
    ConfirmChangeUtxo {
        outputs: Vec<UtxoEntry>,
    },
    Mint {
        key: UtxoKey,
    },
    ProposeBurn {
        amount: u64,
        receiver: String,
        #[serde(default)]
        callback: Option<Address>,
    },
    CancelBurn {
        id: BurnId,
    },
    ConfirmBurn {
        id: BurnId,
        utxos: Vec<UtxoEntry>,
        per_utxo_fee: u64,
    },
    SignBurn {
        id: BurnId,
        signatures: Vec<BurnSignature>,
    },
    RemoveBurn {
        id: BurnId,
    },
    SetUtxo {
        key: UtxoKey,
        #[serde(default)]
        receiver: Option<Address>,
        amount: u64,
        state: u8,
    },
    RemoveUtxo {
        key: UtxoKey,
    },
    UpdateParam {
        update: ParamChange,
    },
    SetMaxUtxoPerTxCount {
        count: u32,
    },
    VerifyAddress {
        address: Address,
        verified: bool,
    },
    ProposeAdministrator {
        address: Address,
    },
    AcceptAdminProposal,
    RemoveAdministrator {
        address: Address,
    },
    AddGatekeeper {
        address: Address,
    },
    RemoveGatekeeper {
        address: Address,
    },
    AddTrustedSigner {
        address: Address,
    },
    RemoveTrustedSigner {
        address: Address,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfirmUtxo { .. } => "confirm_utxo",
            Self::ConfirmChangeUtxo { .. } => "confirm_change_utxo",
            Self::Mint { .. } => "mint",
            Self::ProposeBurn { .. } => "propose_burn",
            Self::CancelBurn { .. } => "cancel_burn",
            Self::ConfirmBurn { .. } => "confirm_burn",
            Self::SignBurn { .. } => "sign_burn",
            Self::RemoveBurn { .. } => "remove_burn",
            Self::SetUtxo { .. } => "set_utxo",
            Self::RemoveUtxo { .. } => "remove_utxo",
            Self::UpdateParam { .. } => "update_param",
            Self::SetMaxUtxoPerTxCount { .. } => "set_max_utxo_per_tx_count",
            Self::VerifyAddress { .. } => "verify_address",
            Self::ProposeAdministrator { .. } => "propose_administrator",
            Self::AcceptAdminProposal => "accept_admin_proposal",
            Self::RemoveAdministrator { .. } => "remove_administrator",
            Self::AddGatekeeper { .. } => "add_gatekeeper",
            Self::RemoveGatekeeper { .. } => "remove_gatekeeper",
            Self::AddTrustedSigner { .. } => "add_trusted_signer",
            Self::RemoveTrustedSigner { .. } => "remove_trusted_signer",
        }
    }
}

/// What happened to one scripted call.
#[derive(Clone, Debug, Serialize)]
pub struct CallReport {
    pub index: usize,
    pub caller: Address,
    pub action: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        #[serde(skip_serializing_if = "Value::is_null")]
        detail: Value,
    },
    Failed {
        error: &'static str,
        kind: &'static str,
        message: String,
    },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl From<Result<Value, LedgerError>> for Outcome {
    fn from(result: Result<Value, LedgerError>) -> Self {
        match result {
            Ok(detail) => Self::Ok { detail },
            Err(err) => Self::Failed {
                error: err.tag(),
                kind: err.kind().name(),
                message: err.to_string(),
            },
        }
    }
}

/// End-of-run view of the ledger.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub calls: usize,
    pub failed: usize,
    pub utxos: usize,
    pub pending_candidates: usize,
    pub burns: usize,
    pub latest_burn_id: Option<BurnId>,
    pub total_supply: u128,
    pub custody_balance: u128,
    pub treasury_balance: u128,
    pub redeem_balance: u128,
    pub snapshot_hash: String,
}

/// Credit the script's opening balances.
pub fn fund(ledger: &mut SimLedger, script: &Script) -> Result<(), LedgerError> {
    for (account, amount) in &script.balances {
        ledger.token_mut().credit(account, u128::from(*amount))?;
    }
    Ok(())
}

/// Run every call in order, collecting one report per call.
pub fn replay(ledger: &mut SimLedger, script: &Script) -> Vec<CallReport> {
    script
        .calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            let outcome = Outcome::from(apply(ledger, call));
            if !outcome.is_ok() {
                tracing::debug!(index, action = call.action.name(), "scripted call failed");
            }
            CallReport {
                index,
                caller: call.caller.clone(),
                action: call.action.name(),
                outcome,
            }
        })
        .collect()
}

pub fn summarize(ledger: &SimLedger, reports: &[CallReport]) -> Result<Summary, LedgerError> {
    let params = ledger.params()?;
    let snapshot = ledger.snapshot()?;
    Ok(Summary {
        calls: reports.len(),
        failed: reports.iter().filter(|r| !r.outcome.is_ok()).count(),
        utxos: ledger.store().utxo_count(),
        pending_candidates: ledger.store().pending_candidate_count(),
        burns: ledger.store().burn_count(),
        latest_burn_id: ledger.latest_burn_id()?,
        total_supply: ledger.token().total_supply(),
        custody_balance: ledger.token().balance_of(ledger.self_address()),
        treasury_balance: ledger.token().balance_of(&params.treasury_address),
        redeem_balance: ledger.token().balance_of(ledger.token().redeem_account()),
        snapshot_hash: snapshot.hash_hex(),
    })
}

/// Execute one call against the ledger.
pub fn apply(ledger: &mut SimLedger, call: &ScriptCall) -> Result<Value, LedgerError> {
    let caller = &call.caller;
    match &call.action {
        Action::ConfirmUtxo {
            key,
            receiver,
            amount,
        } => {
            let outcome = ledger.confirm_utxo(
                caller,
                key.clone(),
                receiver.clone(),
                u128::from(*amount),
            )?;
            Ok(observation_json(&outcome))
        }
        Action::ConfirmChangeUtxo { outputs } => {
            let outputs: Vec<ChangeOutput> = outputs.iter().map(ChangeOutput::from).collect();
            let outcomes = ledger.confirm_change_utxo(caller, &outputs)?;
            Ok(Value::Array(outcomes.iter().map(observation_json).collect()))
        }
        Action::Mint { key } => Ok(receipt_json(&ledger.mint(caller, key)?)),
        Action::ProposeBurn {
            amount,
            receiver,
            callback,
        } => {
            let (id, receipt) = ledger.propose_burn(
                caller,
                u128::from(*amount),
                receiver.clone(),
                callback.clone(),
            )?;
            let mut detail = receipt_json(&receipt);
            detail["burn_id"] = json!(id);
            Ok(detail)
        }
        Action::CancelBurn { id } => Ok(receipt_json(&ledger.cancel_burn(caller, *id)?)),
        Action::ConfirmBurn {
            id,
            utxos,
            per_utxo_fee,
        } => {
            let attached = utxos
                .iter()
                .map(|e| (e.key.clone(), AttachedUtxo::unsigned(u128::from(e.amount))))
                .collect();
            Ok(receipt_json(&ledger.confirm_burn(
                caller,
                attached,
                u128::from(*per_utxo_fee),
                *id,
            )?))
        }
        Action::SignBurn { id, signatures } => {
            ledger.sign_burn(caller, *id, signatures)?;
            Ok(Value::Null)
        }
        Action::RemoveBurn { id } => {
            ledger.remove_burn(caller, *id)?;
            Ok(Value::Null)
        }
        Action::SetUtxo {
            key,
            receiver,
            amount,
            state,
        } => {
            ledger.set_utxo(
                caller,
                key.clone(),
                receiver.clone(),
                u128::from(*amount),
                *state,
            )?;
            Ok(Value::Null)
        }
        Action::RemoveUtxo { key } => {
            ledger.remove_utxo(caller, key)?;
            Ok(Value::Null)
        }
        Action::UpdateParam { update } => {
            let update = ParamUpdate::from(update.clone());
            let name = update.name();
            ledger.update_param(caller, update)?;
            Ok(json!({ "param": name }))
        }
        Action::SetMaxUtxoPerTxCount { count } => {
            ledger.set_max_utxo_per_tx_count(caller, *count)?;
            Ok(Value::Null)
        }
        Action::VerifyAddress { address, verified } => {
            ledger.verify_address(caller, address, *verified)?;
            Ok(Value::Null)
        }
        Action::ProposeAdministrator { address } => {
            ledger.propose_administrator(caller, address)?;
            Ok(Value::Null)
        }
        Action::AcceptAdminProposal => {
            ledger.accept_admin_proposal(caller)?;
            Ok(Value::Null)
        }
        Action::RemoveAdministrator { address } => {
            ledger.remove_administrator(caller, address)?;
            Ok(Value::Null)
        }
        Action::AddGatekeeper { address } => {
            ledger.add_gatekeeper(caller, address)?;
            Ok(Value::Null)
        }
        Action::RemoveGatekeeper { address } => {
            ledger.remove_gatekeeper(caller, address)?;
            Ok(Value::Null)
        }
        Action::AddTrustedSigner { address } => {
            ledger.add_trusted_signer(caller, address)?;
            Ok(Value::Null)
        }
        Action::RemoveTrustedSigner { address } => {
            ledger.remove_trusted_signer(caller, address)?;
            Ok(Value::Null)
        }
    }
}

fn observation_json(outcome: &ObservationOutcome) -> Value {
    match outcome {
        ObservationOutcome::Pending { approvals } => json!({ "pending": approvals }),
        ObservationOutcome::Promoted(record) => json!({
            "promoted": {
                "state": record.state.to_string(),
                "receiver": record.receiver,
                "amount": record.amount,
            }
        }),
        ObservationOutcome::Skipped => json!("skipped"),
    }
}

fn receipt_json(receipt: &Receipt) -> Value {
    json!(receipt)
}
