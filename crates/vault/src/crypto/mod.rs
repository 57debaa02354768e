//! AES-256-CBC field encryption primitives.
//!
//! This module is free of HTTP and storage dependencies. It provides the
//! encrypt/decrypt operations used by the record service.
//!
//! # Envelope format
//!
//! ```text
//! iv:         32 lowercase hex chars (16 random bytes, fresh per call)
//! ciphertext: lowercase hex of AES-256-CBC(PKCS#7(plaintext))
//! ```
//!
//! **No authentication tag.** CBC without a MAC does not detect tampering; a
//! decrypt error is the only signal.

pub mod cipher;
pub mod error;
pub mod key;

pub use cipher::FieldCipher;
pub use error::{BlobIoError, CipherError, DecryptionError, EnvelopeField, InputError};
pub use key::{KeyError, KeyMaterial, KEY_LEN};
