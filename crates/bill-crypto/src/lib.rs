//! Cryptographic primitives for the banknote ledger relay.
//!
//! Provides the canonical bill message and its BLAKE3 content hash, Ed25519
//! signing/verification of that message for physical tags, and per-install
//! key storage.
//!
//! All crypto operations wrap established libraries; none of it is custom.

pub mod hasher;
pub mod keystore;
pub mod provenance;
pub mod signer;

pub use hasher::CanonicalHasher;
pub use keystore::{KeyStoreError, SignerConfig};
pub use provenance::{ProvenanceSigner, SignedPayload};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
