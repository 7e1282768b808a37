//! Foundation types for the banknote ledger relay.
//!
//! Every other crate in the workspace depends on `bill-types`.
//!
//! # Key Types
//!
//! - [`Amount`]: Fixed-precision face value (two fractional digits)
//! - [`BillHash`]: 32-byte content digest of a bill's canonical message
//! - [`BillRecord`]: A serial's committed registration as read from the ledger
//! - [`ScanRequest`]: One accepted extraction event on the scanning client
//! - [`LookupResult`]: Normalized outcome of a remote ledger lookup
//! - [`TreasuryPayload`]: Signed attributes written to a physical tag

pub mod amount;
pub mod bill;
pub mod error;
pub mod hash;
pub mod payload;
pub mod scan;

pub use amount::Amount;
pub use bill::{normalize_currency, normalize_serial, BillRecord};
pub use error::TypeError;
pub use hash::{BillHash, HASH_PREFIX};
pub use payload::TreasuryPayload;
pub use scan::{ExtractedFields, LookupResult, RequestId, ScanFields, ScanRequest};
