use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("value is not a finite number")]
    NotFinite,

    #[error("value must not be negative")]
    Negative,

    #[error("value has more than two decimal places")]
    TooPrecise,

    #[error("value is out of range")]
    OutOfRange,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("denomination must be > 0")]
    InvalidDenomination,
}
