use serde::{Deserialize, Serialize};

use bill_types::{LookupResult, ScanRequest};

use crate::error::{ProtocolError, ProtocolResult};

/// Characters of the bill hash kept in a chain notification.
pub const HASH_DISPLAY_LEN: usize = 18;
/// Characters of an error message kept in a chain notification.
pub const ERROR_DISPLAY_LEN: usize = 60;

const ELLIPSIS: &str = "...";

/// Keep the first `max` characters, marking the cut with an ellipsis.
pub fn truncate_display(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut out: String = text.chars().take(max).collect();
        out.push_str(ELLIPSIS);
        out
    } else {
        text.to_string()
    }
}

/// Messages pushed from the scanning client to its downstream device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    Scan(ScanNotification),
    Chain(ChainNotification),
}

impl Notification {
    pub fn to_json(&self) -> ProtocolResult<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> ProtocolResult<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }

    pub fn serial(&self) -> &str {
        match self {
            Self::Scan(scan) => &scan.serial,
            Self::Chain(chain) => &chain.serial,
        }
    }
}

/// Sent immediately for every accepted scan request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanNotification {
    pub serial: String,
    pub currency: String,
    pub denomination: u32,
    pub blockchain_check: bool,
}

impl ScanNotification {
    pub fn from_request(request: &ScanRequest) -> Self {
        Self {
            serial: request.serial().to_string(),
            currency: request.currency().to_string(),
            denomination: request.denomination(),
            blockchain_check: request.blockchain_check(),
        }
    }

    /// Fixed payload for exercising the downstream link.
    pub fn test_scan(blockchain_check: bool) -> Self {
        Self {
            serial: "B17171999D".into(),
            currency: "USD".into(),
            denomination: 1,
            blockchain_check,
        }
    }
}

/// Ledger verdict for a scan request, sent after its scan notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNotification {
    pub serial: String,
    pub ok: bool,
    pub issued: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, rename = "issuedAt", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<u64>,
}

impl ChainNotification {
    pub fn from_lookup(serial: impl Into<String>, result: &LookupResult) -> Self {
        let serial = serial.into();
        match result {
            LookupResult::Issued { hash, issued_at } => Self {
                serial,
                ok: true,
                issued: true,
                hash: Some(truncate_display(hash, HASH_DISPLAY_LEN)),
                error: None,
                issued_at: Some(*issued_at),
            },
            LookupResult::NotIssued => Self {
                serial,
                ok: true,
                issued: false,
                hash: None,
                error: None,
                issued_at: None,
            },
            LookupResult::Failed { message } => Self {
                serial,
                ok: false,
                issued: false,
                hash: None,
                error: Some(truncate_display(message, ERROR_DISPLAY_LEN)),
                issued_at: None,
            },
        }
    }
}
