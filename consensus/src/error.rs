use custody_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("UTXO {0} is already confirmed")]
    UtxoAlreadyConfirmed(String),

    #[error("signer {signer} already reported UTXO {utxo}")]
    SignerAlreadyConfirmed { signer: String, utxo: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
