use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::signer::{SignatureError, SigningKey};

/// Where the provenance signing key comes from.
///
/// With a `key_path`, the key is generated on first use and persisted so
/// every install has its own key. A `seed_hex` pins the key to a fixed
/// secret and exists for reproducible test fixtures only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    pub key_path: Option<PathBuf>,
    pub seed_hex: Option<String>,
}

impl SignerConfig {
    pub fn with_key_path(path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: Some(path.into()),
            seed_hex: None,
        }
    }

    /// Load or create the signing key described by this config.
    pub fn load_key(&self) -> Result<SigningKey, KeyStoreError> {
        if let Some(seed) = &self.seed_hex {
            warn!("using a configured fixed signing seed; the key is not unique to this install");
            return SigningKey::from_hex(seed).map_err(KeyStoreError::InvalidSeed);
        }

        match &self.key_path {
            Some(path) => load_or_create(path),
            None => {
                debug!("no key path configured, generating an ephemeral signing key");
                Ok(SigningKey::generate())
            }
        }
    }
}

fn load_or_create(path: &Path) -> Result<SigningKey, KeyStoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => SigningKey::from_hex(&contents).map_err(|_| KeyStoreError::CorruptKeyFile {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let key = SigningKey::generate();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, key.to_hex())?;
            restrict_permissions(path)?;
            info!(
                path = %path.display(),
                public_key = %key.verifying_key().to_hex(),
                "generated new provenance signing key"
            );
            Ok(key)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Errors from key storage.
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("invalid signing seed: {0}")]
    InvalidSeed(SignatureError),

    #[error("key file {path} does not contain a 32-byte hex secret")]
    CorruptKeyFile { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
