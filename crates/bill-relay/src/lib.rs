//! Client side of the banknote relay gateway.
//!
//! `RelayClient::lookup` asks the gateway whether a serial is issued. It is
//! bounded by a timeout, never retries, and folds every failure into
//! `LookupResult::Failed` so callers always get a result to report.

pub mod client;
pub mod config;
pub mod error;

pub use client::{normalize_lookup, RegisterOutcome, RelayClient};
pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
