use bill_types::{normalize_currency, normalize_serial, Amount, BillHash};

/// Deterministic message builder and content hasher for bills.
///
/// The canonical message is `serial=<serial>|currency=<currency>|value=<value>`
/// with fixed field order and no escaping. Inputs are normalized first:
/// serial trimmed, currency trimmed and upper-cased, value rendered in its
/// fixed-precision text form. The content hash is the BLAKE3 digest of the
/// message's UTF-8 bytes.
pub struct CanonicalHasher;

impl CanonicalHasher {
    /// Build the canonical message for a bill.
    pub fn canonical_message(serial: &str, currency: &str, value: Amount) -> String {
        format!(
            "serial={}|currency={}|value={}",
            normalize_serial(serial),
            normalize_currency(currency),
            value
        )
    }

    /// Hash a canonical message.
    pub fn compute_hash(message: &str) -> BillHash {
        BillHash::from_digest(*blake3::hash(message.as_bytes()).as_bytes())
    }

    /// Message and hash in one step.
    pub fn bill_hash(serial: &str, currency: &str, value: Amount) -> BillHash {
        Self::compute_hash(&Self::canonical_message(serial, currency, value))
    }

    /// Verify that the bill's attributes produce the expected digest.
    pub fn verify(serial: &str, currency: &str, value: Amount, expected: &BillHash) -> bool {
        Self::bill_hash(serial, currency, value) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn units(n: u64) -> Amount {
        Amount::from_units(n).unwrap()
    }

    #[test]
    fn message_format_is_fixed() {
        let msg = CanonicalHasher::canonical_message("TEST123", "USD", units(10));
        assert_eq!(msg, "serial=TEST123|currency=USD|value=10");
    }

    #[test]
    fn message_normalizes_inputs() {
        let msg = CanonicalHasher::canonical_message("  TEST123 ", " usd ", units(10));
        assert_eq!(msg, "serial=TEST123|currency=USD|value=10");
    }

    #[test]
    fn fractional_value_uses_fixed_precision() {
        let value = Amount::from_f64(2.5).unwrap();
        let msg = CanonicalHasher::canonical_message("S", "EUR", value);
        assert_eq!(msg, "serial=S|currency=EUR|value=2.50");
    }

    #[test]
    fn hash_is_deterministic() {
        let h1 = CanonicalHasher::bill_hash("TEST123", "USD", units(10));
        let h2 = CanonicalHasher::bill_hash("TEST123", "USD", units(10));
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_matches_raw_blake3_of_message() {
        let msg = "serial=A|currency=USD|value=1";
        let expected = *blake3::hash(msg.as_bytes()).as_bytes();
        assert_eq!(CanonicalHasher::compute_hash(msg).as_bytes(), &expected);
    }

    #[test]
    fn normalization_equivalent_inputs_share_hash() {
        let h1 = CanonicalHasher::bill_hash("TEST123", "USD", units(10));
        let h2 = CanonicalHasher::bill_hash(" TEST123", "usd ", units(10));
        assert_eq!(h1, h2);
    }

    #[test]
    fn hex_form_is_prefixed() {
        let hash = CanonicalHasher::bill_hash("TEST123", "USD", units(10));
        assert!(hash.to_hex().starts_with("0x"));
        assert_eq!(hash.to_hex().len(), 66);
    }

    #[test]
    fn verify_detects_tampering() {
        let hash = CanonicalHasher::bill_hash("TEST123", "USD", units(10));
        assert!(CanonicalHasher::verify("TEST123", "USD", units(10), &hash));
        assert!(!CanonicalHasher::verify("TEST123", "USD", units(20), &hash));
    }

    proptest! {
        #[test]
        fn any_field_change_changes_hash(
            serial in "[A-Z0-9]{1,12}",
            currency in "[A-Z]{3}",
            minor in 1u64..1_000_000,
        ) {
            let value = Amount::from_minor(minor).unwrap();
            let base = CanonicalHasher::bill_hash(&serial, &currency, value);

            prop_assert_eq!(base, CanonicalHasher::bill_hash(&serial, &currency, value));

            let other_serial = format!("{serial}X");
            prop_assert_ne!(base, CanonicalHasher::bill_hash(&other_serial, &currency, value));

            let other_currency = format!("{currency}X");
            prop_assert_ne!(base, CanonicalHasher::bill_hash(&serial, &other_currency, value));

            let other_value = Amount::from_minor(minor + 1).unwrap();
            prop_assert_ne!(base, CanonicalHasher::bill_hash(&serial, &currency, other_value));
        }
    }
}
