//! The storage and transport form of one encrypted value.
//!
//! ```text
//! { "iv": "<32 lowercase hex chars>", "ciphertext": "<lowercase hex>" }
//! ```
//!
//! Both fields are plain hex strings so that the record store can persist them
//! verbatim. A missing JSON field deserialises to an empty string; decryption
//! treats an empty field as absent and refuses to proceed.

use serde::{Deserialize, Serialize};

/// Byte length of an initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// Hex length of an encoded initialisation vector.
pub const IV_HEX_LEN: usize = IV_LEN * 2;

/// One `(iv, ciphertext)` pair produced by a single encrypt call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Hex-encoded initialisation vector, unique to this envelope.
    #[serde(default)]
    pub iv: String,
    /// Hex-encoded ciphertext.
    #[serde(default)]
    pub ciphertext: String,
}

impl Envelope {
    /// Construct an envelope from already-encoded parts.
    pub fn new(iv: impl Into<String>, ciphertext: impl Into<String>) -> Self {
        Self {
            iv: iv.into(),
            ciphertext: ciphertext.into(),
        }
    }

    /// Length in bytes of the decoded ciphertext, assuming valid hex.
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len() / 2
    }
}
