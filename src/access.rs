//! Shared-secret access gate checked by the CLI before any evaluation

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Environment variable holding the access key
pub const ACCESS_KEY_ENV: &str = "SCIRAP_ACCESS_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("an access key is required (pass --access-key or set {ACCESS_KEY_ENV})")]
    MissingKey,
    #[error("the access key is incorrect")]
    WrongKey,
    #[error("configured accessKeySha256 is not a 64-digit hex SHA-256 digest")]
    InvalidDigest,
}

/// Hex SHA-256 of a secret, the form stored in config
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares a supplied secret against a configured digest
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    expected: Option<[u8; 32]>,
}

impl AccessGate {
    /// A gate that admits everyone
    pub fn open() -> Self {
        Self::default()
    }

    /// A gate requiring the secret whose hex SHA-256 is `hex_digest`
    pub fn from_digest(hex_digest: &str) -> Result<Self, AccessDenied> {
        let mut expected = [0u8; 32];
        hex::decode_to_slice(hex_digest.trim(), &mut expected)
            .map_err(|_| AccessDenied::InvalidDigest)?;
        Ok(Self {
            expected: Some(expected),
        })
    }

    /// Gate configured by an optional digest
    pub fn from_config(hex_digest: Option<&str>) -> Result<Self, AccessDenied> {
        match hex_digest {
            Some(d) => Self::from_digest(d),
            None => Ok(Self::open()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.expected.is_none()
    }

    pub fn check(&self, secret: Option<&str>) -> Result<(), AccessDenied> {
        let Some(expected) = self.expected else {
            return Ok(());
        };
        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or(AccessDenied::MissingKey)?;

        let actual: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        // Compare every byte regardless of where the first mismatch is
        let diff = actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(())
        } else {
            log::warn!("Rejected access key");
            Err(AccessDenied::WrongKey)
        }
    }
}
