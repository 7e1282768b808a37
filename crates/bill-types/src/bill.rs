use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::hash::BillHash;

/// Serial as it enters the canonical message: surrounding whitespace removed.
pub fn normalize_serial(raw: &str) -> String {
    raw.trim().to_string()
}

/// Currency code as it enters the canonical message: trimmed and upper-cased.
pub fn normalize_currency(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A serial's registration as committed on the ledger.
///
/// The ledger owns this record; `content_hash` and `issued_at` never change
/// once committed. The registry only stores the digest, so `currency` and
/// `value` are known only when the caller can prove them against the digest
/// (the registering request whose locally computed hash matches).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub serial: String,
    pub currency: Option<String>,
    pub value: Option<Amount>,
    pub content_hash: BillHash,
    /// Commit time, Unix seconds.
    pub issued_at: u64,
    pub tx_id: Option<String>,
    pub block_height: Option<u64>,
}

impl BillRecord {
    /// A record as read back from the registry.
    pub fn committed(serial: impl Into<String>, content_hash: BillHash, issued_at: u64) -> Self {
        Self {
            serial: serial.into(),
            currency: None,
            value: None,
            content_hash,
            issued_at,
            tx_id: None,
            block_height: None,
        }
    }

    /// Attach the transaction that committed this record.
    pub fn with_commit(mut self, tx_id: impl Into<String>, block_height: u64) -> Self {
        self.tx_id = Some(tx_id.into());
        self.block_height = Some(block_height);
        self
    }

    /// Attach attributes proven by a matching digest.
    pub fn with_attributes(mut self, currency: impl Into<String>, value: Amount) -> Self {
        self.currency = Some(currency.into());
        self.value = Some(value);
        self
    }
}
