use bill_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("no JSON object in extractor response")]
    NoJsonObject,

    #[error("invalid extractor JSON: {0}")]
    InvalidJson(String),

    #[error("rejected extraction: {0}")]
    Rejected(#[from] TypeError),

    #[error("no field extractor configured")]
    NoExtractor,

    #[error("transport send failed: {0}")]
    Transport(String),

    #[error("ordering lane is closed")]
    LaneClosed,
}

pub type ScanResult<T> = Result<T, ScanError>;
