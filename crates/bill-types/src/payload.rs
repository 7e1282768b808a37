use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Signed bill attributes written to a physical tag.
///
/// Immutable once constructed; `sig` is the encoded signature over the
/// canonical message of the other three fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryPayload {
    serial: String,
    currency: String,
    value: Amount,
    sig: String,
}

impl TreasuryPayload {
    pub fn new(
        serial: impl Into<String>,
        currency: impl Into<String>,
        value: Amount,
        sig: impl Into<String>,
    ) -> Self {
        Self {
            serial: serial.into(),
            currency: currency.into(),
            value,
            sig: sig.into(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn signature(&self) -> &str {
        &self.sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_names() {
        let payload = TreasuryPayload::new("B1", "USD", Amount::from_units(5).unwrap(), "abcd");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["serial"], "B1");
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["value"], 5);
        assert_eq!(value["sig"], "abcd");
    }

    #[test]
    fn decodes_device_json() {
        let payload: TreasuryPayload =
            serde_json::from_str(r#"{"serial":"B17171999D","currency":"USD","value":1,"sig":"ff"}"#)
                .unwrap();
        assert_eq!(payload.serial(), "B17171999D");
        assert_eq!(payload.value(), Amount::from_units(1).unwrap());
        assert_eq!(payload.signature(), "ff");
    }
}
