use bill_protocol::{endpoints, HealthResponse, LookupResponse, RegisterRequest, RegisterResponse};
use bill_types::{Amount, LookupResult};
use reqwest::Url;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};

/// Successful registration as reported by the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub bill_hash: String,
    pub issued_at: u64,
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub already: bool,
}

/// HTTP client for the relay gateway.
#[derive(Clone, Debug)]
pub struct RelayClient {
    config: RelayConfig,
    base: Url,
    client: reqwest::Client,
}

impl RelayClient {
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| RelayError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(RelayError::InvalidUrl(config.base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Ask the gateway whether `serial` is issued.
    ///
    /// Never fails: transport errors, timeouts, non-2xx statuses, and
    /// undecodable bodies all become `LookupResult::Failed`.
    pub async fn lookup(&self, serial: &str) -> LookupResult {
        match self.try_lookup(serial).await {
            Ok(result) => result,
            Err(e) => {
                warn!(serial, error = %e, "ledger lookup failed");
                LookupResult::failed(e.to_string())
            }
        }
    }

    async fn try_lookup(&self, serial: &str) -> RelayResult<LookupResult> {
        let url = self.url(&[endpoints::BILL.trim_start_matches('/'), serial]);
        debug!(%url, "looking up serial");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::Http {
                status: status.as_u16(),
                body: raw,
            });
        }

        let decoded: LookupResponse =
            serde_json::from_str(&raw).map_err(|_| RelayError::Decode(raw.clone()))?;
        Ok(normalize_lookup(decoded))
    }

    /// Register a bill through the gateway.
    pub async fn register_bill(
        &self,
        serial: &str,
        currency: &str,
        value: Amount,
        pubkey: Option<&str>,
    ) -> RelayResult<RegisterOutcome> {
        let mut request = RegisterRequest::new(serial, currency, value.as_f64());
        if let Some(pubkey) = pubkey {
            request = request.with_pubkey(pubkey);
        }

        let url = self.url(&[endpoints::REGISTER.trim_start_matches('/')]);
        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::Http {
                status: status.as_u16(),
                body: raw,
            });
        }

        let decoded: RegisterResponse =
            serde_json::from_str(&raw).map_err(|_| RelayError::Decode(raw.clone()))?;
        if !decoded.ok {
            return Err(RelayError::Rejected("Relay ok=false".into()));
        }

        Ok(RegisterOutcome {
            bill_hash: decoded.bill_hash,
            issued_at: decoded.issued_at,
            tx_hash: decoded.tx_hash,
            block_number: decoded.block_number,
            already: decoded.already,
        })
    }

    pub async fn health(&self) -> RelayResult<HealthResponse> {
        let url = self.url(&[endpoints::HEALTH.trim_start_matches('/')]);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(RelayError::Http {
                status: status.as_u16(),
                body: raw,
            });
        }
        serde_json::from_str(&raw).map_err(|_| RelayError::Decode(raw))
    }

    /// Base URL with percent-encoded path segments appended.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Map a decoded `/bill` body onto a lookup result.
///
/// An explicit `issued` flag wins; without one, a body that still carries a
/// hash and timestamp counts as issued.
pub fn normalize_lookup(resp: LookupResponse) -> LookupResult {
    if resp.ok == Some(false) {
        return LookupResult::failed(resp.error.unwrap_or_else(|| "Relay ok=false".into()));
    }

    match (resp.issued, resp.bill_hash, resp.issued_at) {
        (Some(false), _, _) => LookupResult::NotIssued,
        (Some(true), Some(hash), Some(issued_at)) => LookupResult::Issued { hash, issued_at },
        (Some(true), _, _) => LookupResult::failed("Issued but missing billHash/issuedAt"),
        (None, Some(hash), Some(issued_at)) => LookupResult::Issued { hash, issued_at },
        (None, _, _) => LookupResult::failed("Unrecognized lookup response"),
    }
}
