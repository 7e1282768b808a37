use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Non-2xx response; carries the raw body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The gateway answered `ok: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("{0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RelayResult<T> = Result<T, RelayError>;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
