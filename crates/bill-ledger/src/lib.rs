//! Issued-serial registry consumed by the relay gateway.
//!
//! This crate provides:
//! - The `BillRegistry` capability (`is_issued`, `get_record`,
//!   `submit_registration`, commit confirmation, treasury identity)
//! - `InMemoryLedger`, a registry that rejects duplicate serials at commit
//!   time, for tests, local demos, and the bundled gateway binary

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use traits::{BillRegistry, CommitReceipt, LedgerInfo, TxHandle};
