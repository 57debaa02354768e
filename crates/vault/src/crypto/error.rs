//! Errors produced by the field cipher.
//!
//! None of these carry key material or raw ciphertext; a caller may log or
//! return the `Display` form as is.

use std::{fmt, io, path::PathBuf};

use common::envelope::IV_LEN;
use thiserror::Error;

use super::cipher::BLOCK_LEN;

/// Names one half of an [`common::Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    Iv,
    Ciphertext,
}

impl fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeField::Iv => f.write_str("iv"),
            EnvelopeField::Ciphertext => f.write_str("ciphertext"),
        }
    }
}

/// The envelope itself is unusable; no cipher operation was attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// A required envelope field is empty or absent.
    #[error("envelope is missing its {0} field")]
    MissingField(EnvelopeField),

    /// A field is not a hex string.
    #[error("envelope {0} field is not valid hex")]
    InvalidHex(EnvelopeField),

    /// The IV decodes to the wrong number of bytes.
    #[error("invalid IV length: expected {IV_LEN} bytes, got {0}")]
    InvalidIvLength(usize),
}

/// The inverse cipher ran and rejected the ciphertext.
///
/// This is the only tamper signal available: CBC carries no authentication
/// tag, so a modified ciphertext that still unpads cleanly is not detected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptionError {
    /// Ciphertext length is zero or not a multiple of the block size.
    #[error("ciphertext length {0} is not a non-zero multiple of {BLOCK_LEN} bytes")]
    BlockLength(usize),

    /// PKCS#7 padding check failed (wrong key, wrong IV, or corrupted data).
    #[error("invalid padding")]
    Padding,

    /// The recovered bytes are not UTF-8.
    #[error("decrypted text is not valid UTF-8")]
    InvalidUtf8,
}

/// Any failure of a decrypt call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),
}

/// Failures of the file-based blob helpers.
#[derive(Debug, Error)]
pub enum BlobIoError {
    /// The upload artifact could not be read.
    #[error("failed to read blob from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The decrypted bytes could not be written to the destination.
    #[error("failed to write blob to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Cipher(#[from] CipherError),
}
