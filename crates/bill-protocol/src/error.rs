use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("framing error: {0}")]
    FramingError(String),

    #[error("unsupported text encoding (UTF-16 records are not accepted)")]
    UnsupportedEncoding,

    #[error("language code too long: {0} bytes (max 63)")]
    LanguageTooLong(usize),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
