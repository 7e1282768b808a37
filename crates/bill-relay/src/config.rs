use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

/// Upper bound on a single gateway call, whatever the config says.
pub const MAX_TIMEOUT_SECS: u64 = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Gateway root, e.g. `http://127.0.0.1:8787`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".into(),
            timeout_secs: MAX_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Request timeout, clamped to `1..=MAX_TIMEOUT_SECS` seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
    }

    pub fn load(path: impl AsRef<Path>) -> RelayResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RelayError::Config(e.to_string()))?;
        toml::from_str(&text).map_err(|e| RelayError::Config(e.to_string()))
    }
}
