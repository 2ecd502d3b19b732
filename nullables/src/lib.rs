//! Nullable infrastructure for deterministic testing.
//!
//! The ledger engine depends on storage only through the `custody-store`
//! traits. This crate provides an in-memory implementation that:
//! - Returns deterministic (key-ordered) listings
//! - Can be told to reject commits, to exercise rollback paths
//! - Never touches the filesystem
//!
//! Usage: back a `BridgeLedger` with a [`NullStore`] in tests and tools.

pub mod store;

pub use store::NullStore;
