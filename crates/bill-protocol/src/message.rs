use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /register`.
///
/// Fields are optional at the wire level; the gateway reports missing or
/// malformed ones as invalid input. `value` may arrive as a number or a
/// numeric string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "pubkeyB64", skip_serializing_if = "Option::is_none")]
    pub pubkey_b64: Option<String>,
}

impl RegisterRequest {
    pub fn new(serial: impl Into<String>, currency: impl Into<String>, value: f64) -> Self {
        Self {
            serial: Some(serial.into()),
            currency: Some(currency.into()),
            value: serde_json::Number::from_f64(value).map(Value::Number),
            pubkey_b64: None,
        }
    }

    pub fn with_pubkey(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey_b64 = Some(pubkey.into());
        self
    }

    /// The value as a float, if it is a number or a numeric string.
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Successful `POST /register` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub ok: bool,
    pub already: bool,
    pub issued: bool,
    pub serial: String,
    pub bill_hash: String,
    pub issued_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// `GET /bill` response.
///
/// Every field is optional so the relay client can decode older or partial
/// gateway replies and normalize them itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupResponse {
    pub fn not_issued(serial: impl Into<String>) -> Self {
        Self {
            ok: Some(true),
            issued: Some(false),
            serial: Some(serial.into()),
            ..Default::default()
        }
    }

    pub fn issued(serial: impl Into<String>, bill_hash: impl Into<String>, issued_at: u64) -> Self {
        Self {
            ok: Some(true),
            issued: Some(true),
            serial: Some(serial.into()),
            bill_hash: Some(bill_hash.into()),
            issued_at: Some(issued_at),
            error: None,
        }
    }
}

/// Failure body shared by every gateway endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_request_accepts_numeric_strings() {
        let req: RegisterRequest =
            serde_json::from_value(json!({"serial": "S", "currency": "usd", "value": "10"})).unwrap();
        assert_eq!(req.numeric_value(), Some(10.0));

        let req: RegisterRequest =
            serde_json::from_value(json!({"serial": "S", "currency": "usd", "value": 2.5})).unwrap();
        assert_eq!(req.numeric_value(), Some(2.5));

        let req: RegisterRequest =
            serde_json::from_value(json!({"serial": "S", "value": true})).unwrap();
        assert_eq!(req.numeric_value(), None);
        assert_eq!(req.currency, None);
    }

    #[test]
    fn register_request_pubkey_field_name() {
        let req = RegisterRequest::new("S", "USD", 10.0).with_pubkey("abcd");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["pubkeyB64"], "abcd");
        assert_eq!(value["value"], 10.0);
    }

    #[test]
    fn register_response_omits_absent_tx_fields() {
        let resp = RegisterResponse {
            ok: true,
            already: true,
            issued: true,
            serial: "S".into(),
            bill_hash: "0xab".into(),
            issued_at: 7,
            tx_hash: None,
            block_number: None,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["billHash"], "0xab");
        assert_eq!(value["issuedAt"], 7);
        assert!(value.get("txHash").is_none());
        assert!(value.get("blockNumber").is_none());
    }

    #[test]
    fn lookup_not_issued_shape() {
        let value = serde_json::to_value(LookupResponse::not_issued("UNKNOWN999")).unwrap();
        assert_eq!(value, json!({"ok": true, "issued": false, "serial": "UNKNOWN999"}));
    }

    #[test]
    fn lookup_decodes_partial_bodies() {
        let resp: LookupResponse = serde_json::from_str(r#"{"billHash":"0x1","issuedAt":5}"#).unwrap();
        assert_eq!(resp.issued, None);
        assert_eq!(resp.bill_hash.as_deref(), Some("0x1"));
        assert_eq!(resp.issued_at, Some(5));
    }

    #[test]
    fn error_response_shape() {
        let value = serde_json::to_value(ErrorResponse::new("Value must be > 0")).unwrap();
        assert_eq!(value, json!({"ok": false, "error": "Value must be > 0"}));
    }
}
