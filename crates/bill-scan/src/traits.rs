use async_trait::async_trait;
use bill_protocol::Notification;
use bill_relay::RelayClient;
use bill_types::{ExtractedFields, LookupResult};

use crate::error::ScanResult;

/// Ledger lookup used by the orchestrator. Must not fail: every problem is a
/// `LookupResult::Failed`.
#[async_trait]
pub trait BillLookup: Send + Sync {
    async fn lookup(&self, serial: &str) -> LookupResult;
}

#[async_trait]
impl BillLookup for RelayClient {
    async fn lookup(&self, serial: &str) -> LookupResult {
        RelayClient::lookup(self, serial).await
    }
}

/// Turns a captured image into bill fields.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> ScanResult<ExtractedFields>;
}

/// Downstream link to the verification device.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: &Notification) -> ScanResult<()>;
}
