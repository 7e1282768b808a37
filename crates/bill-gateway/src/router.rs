use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use bill_ledger::BillRegistry;
use bill_protocol::endpoints;

use crate::gateway::LedgerGateway;
use crate::handler;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: LedgerGateway,
}

impl AppState {
    pub fn new(registry: Arc<dyn BillRegistry>) -> Self {
        Self {
            gateway: LedgerGateway::new(registry),
        }
    }
}

/// Build the axum router with all gateway endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::REGISTER, post(handler::register_handler))
        .route(endpoints::BILL, get(handler::lookup_query_handler))
        .route(endpoints::BILL_BY_SERIAL, get(handler::lookup_path_handler))
        .with_state(state)
}
