use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bill_ledger::LedgerError;
use bill_protocol::ErrorResponse;
use thiserror::Error;

/// Gateway failures. Every variant reaches the client as `{ok:false, error}`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    ChainError(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LedgerError> for GatewayError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unavailable(msg) => Self::ServiceUnavailable(msg),
            other => Self::ChainError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
