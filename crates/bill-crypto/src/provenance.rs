use bill_types::{normalize_currency, normalize_serial, Amount, TreasuryPayload};

use crate::hasher::CanonicalHasher;
use crate::keystore::{KeyStoreError, SignerConfig};
use crate::signer::{Signature, SignatureError, SigningKey, VerifyingKey};

/// A signed tag payload together with the key that can verify it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedPayload {
    pub payload: TreasuryPayload,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
}

/// Signs canonical bill messages for physical-tag payloads.
///
/// The key is read-only after construction. Signing is independent of ledger
/// registration: neither outcome affects the other.
pub struct ProvenanceSigner {
    key: SigningKey,
}

impl ProvenanceSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn from_config(config: &SignerConfig) -> Result<Self, KeyStoreError> {
        Ok(Self::new(config.load_key()?))
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign the canonical message of a bill and build its tag payload.
    pub fn sign(&self, serial: &str, currency: &str, value: Amount) -> SignedPayload {
        let serial = normalize_serial(serial);
        let currency = normalize_currency(currency);
        let message = CanonicalHasher::canonical_message(&serial, &currency, value);
        let signature = self.key.sign(message.as_bytes());

        SignedPayload {
            payload: TreasuryPayload::new(serial, currency, value, signature.to_hex()),
            public_key: self.public_key().to_hex(),
        }
    }

    /// Verify a tag payload's signature against a public key.
    pub fn verify(public_key: &VerifyingKey, payload: &TreasuryPayload) -> Result<(), SignatureError> {
        let signature = Signature::from_hex(payload.signature())?;
        let message =
            CanonicalHasher::canonical_message(payload.serial(), payload.currency(), payload.value());
        public_key.verify(message.as_bytes(), &signature)
    }
}

impl std::fmt::Debug for ProvenanceSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceSigner")
            .field("public_key", &self.public_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> Amount {
        Amount::from_units(10).unwrap()
    }

    #[test]
    fn signed_payload_verifies() {
        let signer = ProvenanceSigner::new(SigningKey::generate());
        let signed = signer.sign("TEST123", "USD", ten());
        let key = VerifyingKey::from_hex(&signed.public_key).unwrap();
        assert!(ProvenanceSigner::verify(&key, &signed.payload).is_ok());
    }

    #[test]
    fn payload_fields_are_normalized() {
        let signer = ProvenanceSigner::new(SigningKey::generate());
        let signed = signer.sign(" TEST123 ", "usd", ten());
        assert_eq!(signed.payload.serial(), "TEST123");
        assert_eq!(signed.payload.currency(), "USD");
        assert_eq!(signed.payload.value(), ten());
    }

    #[test]
    fn signature_covers_the_canonical_message() {
        let key = SigningKey::generate();
        let vk = key.verifying_key();
        let expected_msg = CanonicalHasher::canonical_message("TEST123", "USD", ten());
        let signed = ProvenanceSigner::new(key).sign("TEST123", "USD", ten());
        let sig = Signature::from_hex(signed.payload.signature()).unwrap();
        assert!(vk.verify(expected_msg.as_bytes(), &sig).is_ok());
    }

    #[test]
    fn altered_value_fails_verification() {
        let signer = ProvenanceSigner::new(SigningKey::generate());
        let signed = signer.sign("TEST123", "USD", ten());
        let forged = TreasuryPayload::new(
            "TEST123",
            "USD",
            Amount::from_units(100).unwrap(),
            signed.payload.signature(),
        );
        assert_eq!(
            ProvenanceSigner::verify(&signer.public_key(), &forged),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_signature_is_malformed() {
        let signer = ProvenanceSigner::new(SigningKey::generate());
        let payload = TreasuryPayload::new("S", "USD", ten(), "not-a-signature");
        assert_eq!(
            ProvenanceSigner::verify(&signer.public_key(), &payload),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn from_config_uses_seed() {
        let config = SignerConfig {
            key_path: None,
            seed_hex: Some("42".repeat(32)),
        };
        let a = ProvenanceSigner::from_config(&config).unwrap();
        let b = ProvenanceSigner::from_config(&config).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        // Ed25519 is deterministic, so equal keys give equal signatures.
        assert_eq!(a.sign("S", "USD", ten()), b.sign("S", "USD", ten()));
    }
}
