//! Shared utilities for the custody ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
