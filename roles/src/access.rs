//! Capability checks consumed by the ledger engine.

use custody_types::Address;

/// Role predicates answered by the access-control collaborator.
///
/// Checks must be cheap and side-effect free; the engine calls them before
/// touching any state.
///
/// There is no verified-user predicate here: verified users are the
/// ledger's own whitelist, written by `verify_address` and captured in
/// snapshots, so the engine answers that check from its store.
pub trait AccessControl {
    fn is_admin(&self, address: &Address) -> bool;
    fn is_gatekeeper(&self, address: &Address) -> bool;
    fn is_trusted_signer(&self, address: &Address) -> bool;
}
