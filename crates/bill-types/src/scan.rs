use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::bill::{normalize_currency, normalize_serial};
use crate::error::TypeError;

/// Unique token for a scan request (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// Mint a new time-ordered request ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.short_id())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw output of the field extractor. Any field may be missing or `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_denomination")]
    pub denomination: Option<u32>,
}

impl ExtractedFields {
    pub fn new(
        serial: impl Into<String>,
        currency: impl Into<String>,
        denomination: u32,
    ) -> Self {
        Self {
            serial: Some(serial.into()),
            currency: Some(currency.into()),
            denomination: Some(denomination),
        }
    }

    /// Normalize and accept the event: non-empty serial, non-empty currency,
    /// denomination > 0.
    pub fn validate(&self) -> Result<ScanFields, TypeError> {
        let serial = normalize_serial(self.serial.as_deref().unwrap_or_default());
        if serial.is_empty() {
            return Err(TypeError::MissingField("serial"));
        }
        let currency = normalize_currency(self.currency.as_deref().unwrap_or_default());
        if currency.is_empty() {
            return Err(TypeError::MissingField("currency"));
        }
        let denomination = self.denomination.unwrap_or(0);
        if denomination == 0 {
            return Err(TypeError::InvalidDenomination);
        }
        Ok(ScanFields {
            serial,
            currency,
            denomination,
        })
    }
}

/// Accepts `10`, `10.0`, `"10"` or `null`. Anything that is not a positive
/// whole number decodes as `None`.
fn lenient_denomination<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Normalized, accepted extraction fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScanFields {
    pub serial: String,
    pub currency: String,
    pub denomination: u32,
}

impl ScanFields {
    /// Key used to suppress repeated identical extraction events.
    pub fn dedupe_key(&self, blockchain_check: bool) -> String {
        format!(
            "{}|{}|{}|{}",
            self.serial, self.currency, self.denomination, blockchain_check
        )
    }
}

/// One accepted extraction event. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRequest {
    id: RequestId,
    fields: ScanFields,
    blockchain_check: bool,
}

impl ScanRequest {
    /// Create a request with a freshly minted ID.
    pub fn new(fields: ScanFields, blockchain_check: bool) -> Self {
        Self {
            id: RequestId::new(),
            fields,
            blockchain_check,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn serial(&self) -> &str {
        &self.fields.serial
    }

    pub fn currency(&self) -> &str {
        &self.fields.currency
    }

    pub fn denomination(&self) -> u32 {
        self.fields.denomination
    }

    pub fn blockchain_check(&self) -> bool {
        self.blockchain_check
    }

    pub fn dedupe_key(&self) -> String {
        self.fields.dedupe_key(self.blockchain_check)
    }
}

/// Outcome of one remote ledger lookup, consumed exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupResult {
    Issued { hash: String, issued_at: u64 },
    NotIssued,
    Failed { message: String },
}

impl LookupResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_issued(&self) -> bool {
        matches!(self, Self::Issued { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.short_id().len(), 8);
    }

    #[test]
    fn validate_normalizes() {
        let fields = ExtractedFields::new("  A1B2C3D4 ", " usd", 10).validate().unwrap();
        assert_eq!(fields.serial, "A1B2C3D4");
        assert_eq!(fields.currency, "USD");
        assert_eq!(fields.denomination, 10);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut raw = ExtractedFields::new("  ", "USD", 10);
        assert_eq!(raw.validate(), Err(TypeError::MissingField("serial")));

        raw = ExtractedFields::new("S1", "", 10);
        assert_eq!(raw.validate(), Err(TypeError::MissingField("currency")));

        raw = ExtractedFields::new("S1", "USD", 0);
        assert_eq!(raw.validate(), Err(TypeError::InvalidDenomination));

        assert_eq!(
            ExtractedFields::default().validate(),
            Err(TypeError::MissingField("serial"))
        );
    }

    #[test]
    fn lenient_denomination_forms() {
        let parse = |json: &str| serde_json::from_str::<ExtractedFields>(json).unwrap().denomination;
        assert_eq!(parse(r#"{"denomination": 10}"#), Some(10));
        assert_eq!(parse(r#"{"denomination": 20.0}"#), Some(20));
        assert_eq!(parse(r#"{"denomination": "50"}"#), Some(50));
        assert_eq!(parse(r#"{"denomination": null}"#), None);
        assert_eq!(parse(r#"{"denomination": 2.5}"#), None);
        assert_eq!(parse(r#"{"denomination": -5}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn null_fields_decode() {
        let raw: ExtractedFields =
            serde_json::from_str(r#"{"currency": null, "denomination": null, "serial": null}"#)
                .unwrap();
        assert_eq!(raw, ExtractedFields::default());
    }

    #[test]
    fn dedupe_key_includes_check_flag() {
        let fields = ExtractedFields::new("S1", "USD", 5).validate().unwrap();
        assert_eq!(fields.dedupe_key(true), "S1|USD|5|true");
        assert_ne!(fields.dedupe_key(true), fields.dedupe_key(false));
    }

    #[test]
    fn scan_request_accessors() {
        let fields = ExtractedFields::new("S1", "usd", 5).validate().unwrap();
        let request = ScanRequest::new(fields, true);
        assert_eq!(request.serial(), "S1");
        assert_eq!(request.currency(), "USD");
        assert_eq!(request.denomination(), 5);
        assert!(request.blockchain_check());
        assert_eq!(request.dedupe_key(), "S1|USD|5|true");
    }

    #[test]
    fn lookup_result_helpers() {
        assert!(LookupResult::Issued { hash: "0x1".into(), issued_at: 1 }.is_issued());
        assert!(!LookupResult::NotIssued.is_issued());
        assert_eq!(
            LookupResult::failed("boom"),
            LookupResult::Failed { message: "boom".into() }
        );
    }
}
