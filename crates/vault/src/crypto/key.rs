//! [`KeyMaterial`]: the process-wide AES-256 key, decoded from configuration.

use serde::Deserialize;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced while loading the key.
///
/// Messages never echo any part of the configured value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The configured value is empty.
    #[error("encryption key is missing")]
    Missing,

    /// The configured value is not a hex string.
    #[error("encryption key is not valid hex")]
    InvalidHex,

    /// The decoded key material has an unexpected length.
    #[error("encryption key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Built once at startup and shared read-only by every [`super::FieldCipher`].
/// When this type is dropped, the memory is zeroized.
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct KeyMaterial(Box<[u8; KEY_LEN]>);

impl KeyMaterial {
    /// Decode a key from its hex representation.
    ///
    /// Surrounding whitespace is ignored; either letter case is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] for an empty value, [`KeyError::InvalidHex`]
    /// if the value does not decode, and [`KeyError::InvalidLength`] if it does
    /// not decode to exactly [`KEY_LEN`] bytes.
    pub fn from_hex(value: &str) -> Result<Self, KeyError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(KeyError::Missing);
        }
        let bytes = Zeroizing::new(hex::decode(value).map_err(|_| KeyError::InvalidHex)?);
        Self::from_bytes(&bytes)
    }

    /// Copy raw key bytes into a new [`KeyMaterial`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice has the wrong length.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, KeyError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(key_bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key_bytes);
        Ok(Self(buf))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<String> for KeyMaterial {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = Zeroizing::new(value);
        Self::from_hex(&value)
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        (*self.0).zeroize();
    }
}

impl ZeroizeOnDrop for KeyMaterial {}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}
