use serde::{Deserialize, Serialize};

/// HTTP endpoint paths served by the gateway.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const REGISTER: &str = "/register";
    pub const BILL: &str = "/bill";
    pub const BILL_BY_SERIAL: &str = "/bill/:serial";
}

/// Health check response: the ledger identity the gateway submits from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub treasury_address: String,
    pub balance: String,
    pub contract: String,
    pub chain_id: u64,
}
