//! Wire formats for the banknote ledger relay.
//!
//! Defines the JSON bodies exchanged with the gateway, the notifications the
//! scanning client pushes to its downstream device, and the text-record
//! encoding used for physical tags.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod notification;
pub mod tag;

pub use codec::{extract_json_object, TextRecord, TextRecordCodec};
pub use endpoint::{endpoints, HealthResponse};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{ErrorResponse, LookupResponse, RegisterRequest, RegisterResponse};
pub use notification::{
    truncate_display, ChainNotification, Notification, ScanNotification, ERROR_DISPLAY_LEN,
    HASH_DISPLAY_LEN,
};
pub use tag::{TagCheck, TagVerdict};
