use async_trait::async_trait;
use bill_types::{BillHash, BillRecord};

use crate::error::LedgerResult;

/// A submitted, not yet confirmed, registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHandle {
    pub tx_hash: String,
}

/// Confirmation that a registration was committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_hash: String,
    pub block_height: u64,
}

/// Treasury account and registry identity, surfaced by `/health`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerInfo {
    pub treasury_address: String,
    pub balance: String,
    pub contract: String,
    pub chain_id: u64,
}

/// Boundary to the external issued-serial registry.
///
/// The registry is the only serialization point for registrations: at most
/// one record per serial is ever committed, and a losing submitter receives
/// `LedgerError::DuplicateSerial` from either `submit_registration` or
/// `wait_for_commit`.
#[async_trait]
pub trait BillRegistry: Send + Sync {
    async fn is_issued(&self, serial: &str) -> LedgerResult<bool>;

    /// The committed record, or `None` when the serial was never issued.
    async fn get_record(&self, serial: &str) -> LedgerResult<Option<BillRecord>>;

    /// Every successful submission must be followed by `wait_for_commit`.
    async fn submit_registration(&self, serial: &str, hash: BillHash) -> LedgerResult<TxHandle>;

    async fn wait_for_commit(&self, tx: &TxHandle) -> LedgerResult<CommitReceipt>;

    async fn ledger_info(&self) -> LedgerResult<LedgerInfo>;
}
