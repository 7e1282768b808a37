use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Prefix carried by every textual digest.
pub const HASH_PREFIX: &str = "0x";

/// Content digest of a bill's canonical message.
///
/// Rendered as `0x` followed by 64 lowercase hex characters. Parsing accepts
/// the digest with or without the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillHash([u8; 32]);

impl BillHash {
    /// Wrap a pre-computed 32-byte digest.
    pub const fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Prefixed hex representation.
    pub fn to_hex(&self) -> String {
        format!("{HASH_PREFIX}{}", hex::encode(self.0))
    }

    /// Short representation (prefix plus first 8 hex characters).
    pub fn short_hex(&self) -> String {
        format!("{HASH_PREFIX}{}", hex::encode(&self.0[..4]))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let body = s.strip_prefix(HASH_PREFIX).unwrap_or(s);
        let bytes = hex::decode(body).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| TypeError::InvalidLength {
            expected: 32,
            actual: b.len(),
        })?;
        Ok(Self(digest))
    }
}

impl fmt::Debug for BillHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BillHash({})", self.short_hex())
    }
}

impl fmt::Display for BillHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for BillHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for BillHash {
    fn from(digest: [u8; 32]) -> Self {
        Self(digest)
    }
}

impl Serialize for BillHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BillHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_prefixed_and_full_length() {
        let hash = BillHash::from_digest([0xab; 32]);
        let text = hash.to_hex();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);
        assert_eq!(format!("{hash}"), text);
    }

    #[test]
    fn parses_with_and_without_prefix() {
        let hash = BillHash::from_digest([7; 32]);
        let prefixed = hash.to_hex();
        let bare = prefixed.trim_start_matches("0x").to_string();
        assert_eq!(BillHash::from_hex(&prefixed).unwrap(), hash);
        assert_eq!(bare.parse::<BillHash>().unwrap(), hash);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = BillHash::from_hex("0xabcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, actual: 2 });
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            BillHash::from_hex("0xzz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_prefixed_string() {
        let hash = BillHash::from_digest([1; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let parsed: BillHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn short_hex_is_prefix_plus_8_chars() {
        let hash = BillHash::from_digest([0x12; 32]);
        assert_eq!(hash.short_hex(), "0x12121212");
    }
}
