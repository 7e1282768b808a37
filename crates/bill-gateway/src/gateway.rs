use std::sync::Arc;

use bill_crypto::CanonicalHasher;
use bill_ledger::{BillRegistry, CommitReceipt, LedgerError, LedgerResult};
use bill_protocol::{HealthResponse, LookupResponse, RegisterRequest, RegisterResponse};
use bill_types::{normalize_currency, normalize_serial, Amount, BillHash, BillRecord};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};

/// A registration result: the record as re-read from the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub record: BillRecord,
    /// The serial was issued before this call, possibly by a concurrent
    /// submitter that won the commit.
    pub already: bool,
}

impl Registration {
    pub fn to_response(&self) -> RegisterResponse {
        let (tx_hash, block_number) = if self.already {
            (None, None)
        } else {
            (self.record.tx_id.clone(), self.record.block_height)
        };
        RegisterResponse {
            ok: true,
            already: self.already,
            issued: true,
            serial: self.record.serial.clone(),
            bill_hash: self.record.content_hash.to_hex(),
            issued_at: self.record.issued_at,
            tx_hash,
            block_number,
        }
    }
}

/// Idempotent registration and lookup against an issued-serial registry.
///
/// Holds no state of its own: uniqueness rests entirely on the registry's
/// commit. A duplicate rejected at submission or at commit is reported as an
/// already-issued registration.
#[derive(Clone)]
pub struct LedgerGateway {
    registry: Arc<dyn BillRegistry>,
}

impl LedgerGateway {
    pub fn new(registry: Arc<dyn BillRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn BillRegistry> {
        &self.registry
    }

    /// Register a bill. Serial is trimmed and currency upper-cased before
    /// anything touches the ledger.
    pub async fn register(
        &self,
        serial: &str,
        currency: &str,
        value: Amount,
    ) -> GatewayResult<Registration> {
        let serial = normalize_serial(serial);
        let currency = normalize_currency(currency);
        if serial.is_empty() || currency.is_empty() {
            return Err(GatewayError::InvalidInput("Missing serial/currency/value".into()));
        }
        if value.is_zero() {
            return Err(GatewayError::InvalidInput("Value must be > 0".into()));
        }
        let (serial, currency) = (serial.as_str(), currency.as_str());

        if self.registry.is_issued(serial).await? {
            return self.existing(serial).await;
        }

        let hash = CanonicalHasher::bill_hash(serial, currency, value);
        let receipt = match self.submit_and_confirm(serial, hash).await {
            Ok(receipt) => receipt,
            Err(LedgerError::DuplicateSerial { .. }) => {
                warn!(serial, "lost registration race, returning committed record");
                return self.existing(serial).await;
            }
            Err(e) => return Err(e.into()),
        };

        let record = self.fetch(serial).await?;
        let record = if record.content_hash == hash {
            record.with_attributes(currency, value)
        } else {
            record
        };

        info!(
            serial,
            hash = %hash.short_hex(),
            block = receipt.block_height,
            "bill registered"
        );

        Ok(Registration {
            record: record.with_commit(receipt.tx_hash, receipt.block_height),
            already: false,
        })
    }

    /// Decode a `POST /register` body and register it.
    pub async fn handle_register(&self, request: &RegisterRequest) -> GatewayResult<RegisterResponse> {
        let (Some(serial), Some(currency), Some(value)) = (
            request.serial.as_deref(),
            request.currency.as_deref(),
            request.numeric_value().filter(|v| v.is_finite()),
        ) else {
            return Err(GatewayError::InvalidInput("Missing serial/currency/value".into()));
        };
        if value <= 0.0 {
            return Err(GatewayError::InvalidInput("Value must be > 0".into()));
        }
        let value = Amount::from_f64(value)
            .map_err(|e| GatewayError::InvalidInput(format!("Invalid value: {e}")))?;

        if let Some(pubkey) = request.pubkey_b64.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            debug!(serial = %serial.trim(), pubkey, "registration carries a tag public key");
        }

        Ok(self.register(serial, currency, value).await?.to_response())
    }

    /// Look a serial up. Unknown serials are a successful `issued: false`.
    pub async fn lookup(&self, serial: &str) -> GatewayResult<LookupResponse> {
        let serial = normalize_serial(serial);
        if serial.is_empty() {
            return Err(GatewayError::InvalidInput("Missing serial".into()));
        }

        if !self.registry.is_issued(&serial).await? {
            return Ok(LookupResponse::not_issued(serial));
        }

        let record = self.fetch(&serial).await?;
        Ok(LookupResponse::issued(
            serial,
            record.content_hash.to_hex(),
            record.issued_at,
        ))
    }

    pub async fn health(&self) -> GatewayResult<HealthResponse> {
        let info = self.registry.ledger_info().await?;
        Ok(HealthResponse {
            ok: true,
            treasury_address: info.treasury_address,
            balance: info.balance,
            contract: info.contract,
            chain_id: info.chain_id,
        })
    }

    async fn submit_and_confirm(&self, serial: &str, hash: BillHash) -> LedgerResult<CommitReceipt> {
        let tx = self.registry.submit_registration(serial, hash).await?;
        debug!(serial, tx = %tx.tx_hash, "awaiting commit");
        self.registry.wait_for_commit(&tx).await
    }

    async fn existing(&self, serial: &str) -> GatewayResult<Registration> {
        Ok(Registration {
            record: self.fetch(serial).await?,
            already: true,
        })
    }

    async fn fetch(&self, serial: &str) -> GatewayResult<BillRecord> {
        let record = self.registry.get_record(serial).await?;
        Ok(record.ok_or_else(|| LedgerError::NotFound {
            serial: serial.to_string(),
        })?)
    }
}
