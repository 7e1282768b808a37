/// Errors produced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The serial already has a committed record. Raised at submission or at
    /// commit, whichever observes the conflict first.
    #[error("serial {serial} is already issued")]
    DuplicateSerial { serial: String },

    #[error("no committed record for serial {serial}")]
    NotFound { serial: String },

    #[error("unknown transaction {0}")]
    UnknownTransaction(String),

    /// The registry could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The registry rejected or reverted the call.
    #[error("ledger call reverted: {0}")]
    Reverted(String),

    #[error("store error: {0}")]
    StoreError(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
