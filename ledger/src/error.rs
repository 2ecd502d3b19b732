//! Entrypoint-level errors.
//!
//! Every failure aborts the whole call. Client tooling distinguishes
//! failures by [`LedgerError::tag`] and groups them by [`LedgerError::kind`].

use custody_consensus::ConsensusError;
use custody_roles::RoleError;
use custody_store::StoreError;
use custody_token::TokenError;
use custody_types::BurnId;
use std::fmt;
use thiserror::Error;

/// Failure classes reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller lacks the required role.
    Authorization,
    /// Inputs or current state do not satisfy the operation.
    Precondition,
    /// A referenced UTXO or burn does not exist.
    NotFound,
    /// The operation was already performed.
    Conflict,
    /// The token ledger or fee arithmetic failed.
    Integration,
    /// The operation would break a registry invariant.
    Invariant,
    /// Storage, configuration or snapshot failure.
    Infrastructure,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Authorization => "AuthorizationError",
            Self::Precondition => "PreconditionError",
            Self::NotFound => "NotFoundError",
            Self::Conflict => "ConflictError",
            Self::Integration => "IntegrationError",
            Self::Invariant => "InvariantError",
            Self::Infrastructure => "InfrastructureError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Authorization ────────────────────────────────────────────────────
    #[error("caller {0} is not an administrator")]
    NotAdmin(String),

    #[error("caller {0} is not a gatekeeper")]
    NotGatekeeper(String),

    #[error("caller {0} is not a trusted signer")]
    NotTrustedSigner(String),

    #[error("caller {0} is not a verified user")]
    NotVerifiedUser(String),

    #[error("caller {0} may not act on this burn")]
    NotAllowed(String),

    #[error("caller {0} has no pending administrator proposal")]
    NotProposedAdmin(String),

    // ── Precondition ─────────────────────────────────────────────────────
    #[error("amount too low: {amount} < {minimum}")]
    AmountTooLow { amount: u128, minimum: u128 },

    #[error("BTC network fee too high: {fee} > {max}")]
    FeeTooHigh { fee: u128, max: u128 },

    #[error("too many UTXOs: {count} attached, must be fewer than {max}")]
    TooManyUtxos { count: usize, max: u32 },

    #[error("UTXO {0} is in the wrong state")]
    InvalidUtxoState(String),

    #[error("burn {id} is in state {state}, expected Proposed")]
    InvalidBurnState { id: BurnId, state: String },

    #[error("burn {0} is already confirmed")]
    BurnAlreadyConfirmed(BurnId),

    #[error("UTXO {0} carries signatures; add them with sign_burn")]
    SignatureCannotBeSet(String),

    #[error("UTXO {0} has no receiver")]
    ReceiverNotSet(String),

    #[error("UTXO {utxo} holds {stored}, burn entry claims {supplied}")]
    UtxoAmountMismatch {
        utxo: String,
        stored: u128,
        supplied: u128,
    },

    // ── Not found ────────────────────────────────────────────────────────
    #[error("unknown UTXO {0}")]
    InvalidUtxoKey(String),

    #[error("unknown burn {0}")]
    InvalidBurnId(BurnId),

    #[error("UTXO {utxo} is not attached to burn {id}")]
    UtxoNotPartOfBurn { id: BurnId, utxo: String },

    // ── Conflict ─────────────────────────────────────────────────────────
    #[error("UTXO {0} is already confirmed")]
    UtxoAlreadyConfirmed(String),

    #[error("signer {signer} already reported UTXO {utxo}")]
    SignerAlreadyConfirmed { signer: String, utxo: String },

    #[error("{0} is already an administrator or has a pending proposal")]
    AlreadyAdmin(String),

    // ── Integration ──────────────────────────────────────────────────────
    #[error("token ledger has no {0} entrypoint")]
    InvalidEntrypoint(&'static str),

    #[error("arithmetic failure: {0}")]
    Arithmetic(&'static str),

    #[error("token ledger rejected the call: {0}")]
    Token(TokenError),

    // ── Invariant ────────────────────────────────────────────────────────
    #[error("cannot remove the last administrator")]
    CannotRemoveLastAdmin,

    // ── Infrastructure ───────────────────────────────────────────────────
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin(_)
            | Self::NotGatekeeper(_)
            | Self::NotTrustedSigner(_)
            | Self::NotVerifiedUser(_)
            | Self::NotAllowed(_)
            | Self::NotProposedAdmin(_) => ErrorKind::Authorization,
            Self::AmountTooLow { .. }
            | Self::FeeTooHigh { .. }
            | Self::TooManyUtxos { .. }
            | Self::InvalidUtxoState(_)
            | Self::InvalidBurnState { .. }
            | Self::BurnAlreadyConfirmed(_)
            | Self::SignatureCannotBeSet(_)
            | Self::ReceiverNotSet(_)
            | Self::UtxoAmountMismatch { .. } => ErrorKind::Precondition,
            Self::InvalidUtxoKey(_) | Self::InvalidBurnId(_) | Self::UtxoNotPartOfBurn { .. } => {
                ErrorKind::NotFound
            }
            Self::UtxoAlreadyConfirmed(_)
            | Self::SignerAlreadyConfirmed { .. }
            | Self::AlreadyAdmin(_) => ErrorKind::Conflict,
            Self::InvalidEntrypoint(_) | Self::Arithmetic(_) | Self::Token(_) => {
                ErrorKind::Integration
            }
            Self::CannotRemoveLastAdmin => ErrorKind::Invariant,
            Self::Store(_) | Self::Config(_) | Self::Snapshot(_) => ErrorKind::Infrastructure,
        }
    }

    /// Stable identifier of the failure.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NotAdmin(_) => "NotAdmin",
            Self::NotGatekeeper(_) => "NotGatekeeper",
            Self::NotTrustedSigner(_) => "NotTrustedSigner",
            Self::NotVerifiedUser(_) => "NotVerifiedUser",
            Self::NotAllowed(_) => "NotAllowed",
            Self::NotProposedAdmin(_) => "NotProposedAdmin",
            Self::AmountTooLow { .. } => "AmountTooLow",
            Self::FeeTooHigh { .. } => "FeeTooHigh",
            Self::TooManyUtxos { .. } => "TooManyUtxos",
            Self::InvalidUtxoState(_) => "InvalidUtxoState",
            Self::InvalidBurnState { .. } => "InvalidBurnState",
            Self::BurnAlreadyConfirmed(_) => "BurnAlreadyConfirmed",
            Self::SignatureCannotBeSet(_) => "SignatureCannotBeSet",
            Self::ReceiverNotSet(_) => "ReceiverNotSet",
            Self::UtxoAmountMismatch { .. } => "UtxoAmountMismatch",
            Self::InvalidUtxoKey(_) => "InvalidUtxoKey",
            Self::InvalidBurnId(_) => "InvalidBurnId",
            Self::UtxoNotPartOfBurn { .. } => "UtxoNotPartOfBurn",
            Self::UtxoAlreadyConfirmed(_) => "UtxoAlreadyConfirmed",
            Self::SignerAlreadyConfirmed { .. } => "SignerAlreadyConfirmed",
            Self::AlreadyAdmin(_) => "AlreadyAdmin",
            Self::InvalidEntrypoint(_) => "InvalidEntrypoint",
            Self::Arithmetic(_) => "ArithmeticError",
            Self::Token(_) => "TokenLedgerError",
            Self::CannotRemoveLastAdmin => "CannotRemoveLastAdmin",
            Self::Store(_) => "StoreError",
            Self::Config(_) => "ConfigError",
            Self::Snapshot(_) => "SnapshotError",
        }
    }
}

impl From<ConsensusError> for LedgerError {
    fn from(err: ConsensusError) -> Self {
        match err {
            ConsensusError::UtxoAlreadyConfirmed(utxo) => Self::UtxoAlreadyConfirmed(utxo),
            ConsensusError::SignerAlreadyConfirmed { signer, utxo } => {
                Self::SignerAlreadyConfirmed { signer, utxo }
            }
            ConsensusError::Store(e) => Self::Store(e),
        }
    }
}

impl From<RoleError> for LedgerError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::NotAdmin(caller) => Self::NotAdmin(caller),
            RoleError::AlreadyAdmin(address) => Self::AlreadyAdmin(address),
            RoleError::NotProposedAdmin(caller) => Self::NotProposedAdmin(caller),
            RoleError::CannotRemoveLastAdmin => Self::CannotRemoveLastAdmin,
        }
    }
}

impl From<TokenError> for LedgerError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingEntrypoint(name) => Self::InvalidEntrypoint(name),
            other => Self::Token(other),
        }
    }
}
