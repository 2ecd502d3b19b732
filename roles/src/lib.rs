//! Access control for the custody ledger.
//!
//! The ledger engine never owns role membership. It asks an [`AccessControl`]
//! implementation three questions (is this caller an admin, a gatekeeper,
//! a trusted signer?) at the top of every entrypoint. Verified users are
//! answered by the ledger's own whitelist.
//!
//! [`RoleRegistry`] is the reference implementation:
//! - Administrators join in two steps (proposal, then acceptance).
//! - The last set administrator cannot be removed.
//! - Gatekeepers and trusted signers are plain sets managed by admins.

pub mod access;
pub mod error;
pub mod registry;

pub use access::AccessControl;
pub use error::RoleError;
pub use registry::{AdminStatus, RoleRegistry};
