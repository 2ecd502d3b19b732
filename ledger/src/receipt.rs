//! External effects of a successful call.

use custody_token::TokenOperation;
use custody_types::{Address, BurnId};
use serde::{Deserialize, Serialize};

/// Notification sent to the callback target of `propose_burn`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callback {
    pub target: Address,
    pub burn_id: BurnId,
}

/// Token operations issued by a call, in execution order, plus an optional
/// fire-and-forget callback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub token_ops: Vec<TokenOperation>,
    pub callback: Option<Callback>,
}
