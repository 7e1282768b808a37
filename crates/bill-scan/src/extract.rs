use bill_protocol::extract_json_object;
use bill_types::ExtractedFields;

use crate::error::{ScanError, ScanResult};

/// Decode the field extractor's free-text reply.
///
/// The reply may wrap its JSON object in prose or code fences; the span from
/// the first `{` to the last `}` is decoded. Fields may be `null`.
pub fn parse_extractor_response(text: &str) -> ScanResult<ExtractedFields> {
    let json = extract_json_object(text.as_bytes()).ok_or(ScanError::NoJsonObject)?;
    serde_json::from_str(&json).map_err(|e| ScanError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"currency\": \"usd\", \"denomination\": 20, \"serial\": \" MB123 \"}\n```";
        let fields = parse_extractor_response(reply).unwrap();
        let accepted = fields.validate().unwrap();
        assert_eq!(accepted.serial, "MB123");
        assert_eq!(accepted.currency, "USD");
        assert_eq!(accepted.denomination, 20);
    }

    #[test]
    fn nulls_decode_but_fail_validation() {
        let fields =
            parse_extractor_response(r#"{"currency": null, "denomination": null, "serial": "X1"}"#)
                .unwrap();
        assert_eq!(fields.serial.as_deref(), Some("X1"));
        assert!(fields.validate().is_err());
    }

    #[test]
    fn reply_without_object() {
        assert!(matches!(
            parse_extractor_response("I could not read the note."),
            Err(ScanError::NoJsonObject)
        ));
        assert!(matches!(
            parse_extractor_response("{not json}"),
            Err(ScanError::InvalidJson(_))
        ));
    }
}
