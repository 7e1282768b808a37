use bill_crypto::{ProvenanceSigner, VerifyingKey};
use bill_types::{Amount, TreasuryPayload};

use crate::notification::ScanNotification;

/// Outcome of checking a physical tag against the last scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagVerdict {
    Verified,
    Mismatch { reason: String },
    InvalidSignature,
}

impl TagVerdict {
    fn mismatch(reason: &str) -> Self {
        Self::Mismatch {
            reason: reason.to_string(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Compares tag payloads with the bill the scanner last reported.
pub struct TagCheck;

impl TagCheck {
    /// Field comparison only: serial, then currency, then value.
    pub fn check(expected: Option<&ScanNotification>, payload: &TreasuryPayload) -> TagVerdict {
        let Some(expected) = expected else {
            return TagVerdict::mismatch("No app data");
        };

        if payload.serial() != expected.serial {
            return TagVerdict::mismatch("Serial mismatch");
        }
        if payload.currency() != expected.currency {
            return TagVerdict::mismatch("Currency mismatch");
        }
        match Amount::from_units(u64::from(expected.denomination)) {
            Ok(value) if value == payload.value() => TagVerdict::Verified,
            _ => TagVerdict::mismatch("Value mismatch"),
        }
    }

    /// Signature only.
    pub fn verify_signature(public_key: &VerifyingKey, payload: &TreasuryPayload) -> TagVerdict {
        if payload.signature().trim().is_empty() {
            return TagVerdict::mismatch("Missing sig");
        }
        match ProvenanceSigner::verify(public_key, payload) {
            Ok(()) => TagVerdict::Verified,
            Err(_) => TagVerdict::InvalidSignature,
        }
    }

    /// Signature first, then the field comparison.
    pub fn verify(
        public_key: &VerifyingKey,
        expected: Option<&ScanNotification>,
        payload: &TreasuryPayload,
    ) -> TagVerdict {
        match Self::verify_signature(public_key, payload) {
            TagVerdict::Verified => Self::check(expected, payload),
            failed => failed,
        }
    }
}
