use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bill_types::{BillHash, BillRecord, HASH_PREFIX};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::traits::{BillRegistry, CommitReceipt, LedgerInfo, TxHandle};

/// In-memory registry for tests, local demos, and embedding.
///
/// Submissions land in a pending pool; `wait_for_commit` moves them into the
/// committed set one block at a time. Serial uniqueness is checked again at
/// commit, so two submissions that both passed the submit-time check still
/// yield exactly one committed record.
///
/// A pending entry is removed by its `wait_for_commit`, whether the commit
/// succeeds or is rejected as a duplicate. Callers that submit must confirm;
/// an unconfirmed submission stays pending for the ledger's lifetime.
pub struct InMemoryLedger {
    config: LedgerConfig,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    records: HashMap<String, BillRecord>,
    pending: HashMap<String, PendingTx>,
    height: u64,
    nonce: u64,
}

struct PendingTx {
    serial: String,
    hash: BillHash,
}

impl InMemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Number of committed records.
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height of the last committed block; zero before the first commit.
    pub fn height(&self) -> u64 {
        self.inner.read().map(|s| s.height).unwrap_or(0)
    }

    /// Number of submissions not yet confirmed.
    pub fn pending_len(&self) -> usize {
        self.inner.read().map(|s| s.pending.len()).unwrap_or(0)
    }

    fn read_state(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::StoreError("ledger lock poisoned".into()))
    }

    fn write_state(&self) -> LedgerResult<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::StoreError("ledger lock poisoned".into()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[async_trait]
impl BillRegistry for InMemoryLedger {
    async fn is_issued(&self, serial: &str) -> LedgerResult<bool> {
        Ok(self.read_state()?.records.contains_key(serial))
    }

    async fn get_record(&self, serial: &str) -> LedgerResult<Option<BillRecord>> {
        Ok(self.read_state()?.records.get(serial).cloned())
    }

    async fn submit_registration(&self, serial: &str, hash: BillHash) -> LedgerResult<TxHandle> {
        let mut state = self.write_state()?;
        if state.records.contains_key(serial) {
            return Err(LedgerError::DuplicateSerial {
                serial: serial.to_string(),
            });
        }

        state.nonce += 1;
        let tx_hash = transaction_hash(serial, &hash, state.nonce);
        state.pending.insert(
            tx_hash.clone(),
            PendingTx {
                serial: serial.to_string(),
                hash,
            },
        );
        debug!(serial, tx = %tx_hash, "registration submitted");

        Ok(TxHandle { tx_hash })
    }

    async fn wait_for_commit(&self, tx: &TxHandle) -> LedgerResult<CommitReceipt> {
        let mut state = self.write_state()?;
        let pending = state
            .pending
            .remove(&tx.tx_hash)
            .ok_or_else(|| LedgerError::UnknownTransaction(tx.tx_hash.clone()))?;

        if state.records.contains_key(&pending.serial) {
            return Err(LedgerError::DuplicateSerial {
                serial: pending.serial,
            });
        }

        state.height += 1;
        let block_height = state.height;
        let issued_at = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        let record = BillRecord::committed(pending.serial.clone(), pending.hash, issued_at)
            .with_commit(tx.tx_hash.clone(), block_height);
        state.records.insert(pending.serial.clone(), record);

        info!(
            serial = %pending.serial,
            hash = %pending.hash.short_hex(),
            block = block_height,
            "registration committed"
        );

        Ok(CommitReceipt {
            tx_hash: tx.tx_hash.clone(),
            block_height,
        })
    }

    async fn ledger_info(&self) -> LedgerResult<LedgerInfo> {
        Ok(LedgerInfo {
            treasury_address: self.config.treasury_address.clone(),
            balance: self.config.initial_balance.clone(),
            contract: self.config.contract.clone(),
            chain_id: self.config.chain_id,
        })
    }
}

fn transaction_hash(serial: &str, hash: &BillHash, nonce: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(serial.as_bytes());
    hasher.update(hash.as_bytes());
    hasher.update(&nonce.to_le_bytes());
    format!("{HASH_PREFIX}{}", hasher.finalize().to_hex())
}
