use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use bill_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Default port of the relay gateway.
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Allow cross-origin requests from any origin.
    pub enable_cors: bool,
    pub ledger: LedgerConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            enable_cors: true,
            ledger: LedgerConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> GatewayResult<Self> {
        toml::from_str(text).map_err(|e| GatewayError::Config(e.to_string()))
    }
}
