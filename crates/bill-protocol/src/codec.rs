use bill_types::TreasuryPayload;

use crate::error::{ProtocolError, ProtocolResult};

/// Bit 7 of the status byte selects UTF-16 text.
const UTF16_FLAG: u8 = 0x80;
/// Low six bits of the status byte hold the language-code length.
const LANGUAGE_LEN_MASK: u8 = 0x3F;
const MAX_LANGUAGE_LEN: usize = LANGUAGE_LEN_MASK as usize;

/// Language code written with tag payloads.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A well-known text record: language code plus UTF-8 text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRecord {
    pub language: String,
    pub text: String,
}

impl TextRecord {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }
}

/// Encoder and decoder for text-record payloads carried on physical tags.
///
/// Layout: one status byte (language-code length, UTF-8 only), the ASCII
/// language code, then the text.
pub struct TextRecordCodec;

impl TextRecordCodec {
    pub fn encode(record: &TextRecord) -> ProtocolResult<Vec<u8>> {
        let language = record.language.as_bytes();
        if language.len() > MAX_LANGUAGE_LEN {
            return Err(ProtocolError::LanguageTooLong(language.len()));
        }

        let mut buf = Vec::with_capacity(1 + language.len() + record.text.len());
        buf.push(language.len() as u8 & LANGUAGE_LEN_MASK);
        buf.extend_from_slice(language);
        buf.extend_from_slice(record.text.as_bytes());
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> ProtocolResult<TextRecord> {
        let (&status, rest) = bytes
            .split_first()
            .ok_or_else(|| ProtocolError::FramingError("empty record".into()))?;
        if status & UTF16_FLAG != 0 {
            return Err(ProtocolError::UnsupportedEncoding);
        }

        let lang_len = (status & LANGUAGE_LEN_MASK) as usize;
        if rest.len() < lang_len {
            return Err(ProtocolError::FramingError(format!(
                "language code needs {lang_len} bytes, record has {}",
                rest.len()
            )));
        }

        let (language, text) = rest.split_at(lang_len);
        let language = std::str::from_utf8(language)
            .map_err(|_| ProtocolError::FramingError("language code is not ASCII".into()))?;
        let text = std::str::from_utf8(text)
            .map_err(|e| ProtocolError::FramingError(format!("text is not UTF-8: {e}")))?;

        Ok(TextRecord::new(language, text))
    }

    /// Serialize a tag payload to JSON and wrap it in an `en` text record.
    pub fn encode_payload(payload: &TreasuryPayload) -> ProtocolResult<Vec<u8>> {
        let json = serde_json::to_string(payload)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Self::encode(&TextRecord::new(DEFAULT_LANGUAGE, json))
    }

    pub fn decode_payload(bytes: &[u8]) -> ProtocolResult<TreasuryPayload> {
        let record = Self::decode(bytes)?;
        serde_json::from_str(&record.text).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }
}

/// Pull the JSON object out of a raw tag page dump.
///
/// NUL bytes are dropped and the span from the first `{` to the last `}` is
/// returned. Text before and after the braces (record headers, padding) is
/// ignored.
pub fn extract_json_object(raw: &[u8]) -> Option<String> {
    let cleaned: Vec<u8> = raw.iter().copied().filter(|&b| b != 0).collect();
    let text = String::from_utf8_lossy(&cleaned);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(text[start..=end].to_string())
}
