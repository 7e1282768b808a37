use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use bill_protocol::{HealthResponse, LookupResponse, RegisterRequest, RegisterResponse};
use serde::Deserialize;

use crate::error::GatewayResult;
use crate::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SerialQuery {
    pub serial: Option<String>,
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> GatewayResult<Json<HealthResponse>> {
    Ok(Json(state.gateway.health().await?))
}

/// `POST /register`
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> GatewayResult<Json<RegisterResponse>> {
    let Json(request) = body?;
    Ok(Json(state.gateway.handle_register(&request).await?))
}

/// `GET /bill?serial=...`
pub async fn lookup_query_handler(
    State(state): State<AppState>,
    Query(query): Query<SerialQuery>,
) -> GatewayResult<Json<LookupResponse>> {
    let serial = query.serial.unwrap_or_default();
    Ok(Json(state.gateway.lookup(&serial).await?))
}

/// `GET /bill/:serial`; a blank path segment falls back to the query string.
pub async fn lookup_path_handler(
    State(state): State<AppState>,
    Path(serial): Path<String>,
    Query(query): Query<SerialQuery>,
) -> GatewayResult<Json<LookupResponse>> {
    let serial = if serial.trim().is_empty() {
        query.serial.unwrap_or_default()
    } else {
        serial
    };
    Ok(Json(state.gateway.lookup(&serial).await?))
}
