use serde::{Deserialize, Serialize};

/// Treasury identity reported by the in-memory registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub treasury_address: String,
    pub contract: String,
    pub chain_id: u64,
    /// Display balance of the treasury account.
    pub initial_balance: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            treasury_address: "0x0000000000000000000000000000000000000001".into(),
            contract: "0x0000000000000000000000000000000000000002".into(),
            chain_id: 31337,
            initial_balance: "0.0".into(),
        }
    }
}
