//! Client-side scan orchestration.
//!
//! Accepted extraction events become scan requests. Each request emits a scan
//! notification and, when ledger checking is on, a chain notification once
//! its lookup resolves. All notifications pass through one ordering lane, and
//! a lookup that resolves after a newer request was accepted is dropped.

pub mod error;
pub mod extract;
pub mod lane;
pub mod orchestrator;
pub mod state;
pub mod traits;
pub mod transport;

pub use error::{ScanError, ScanResult};
pub use extract::parse_extractor_response;
pub use lane::OrderingLane;
pub use orchestrator::{ScanOrchestrator, ScanOutcome};
pub use state::CycleState;
pub use traits::{BillLookup, FieldExtractor, Transport};
pub use transport::{ChannelTransport, WriterTransport};
