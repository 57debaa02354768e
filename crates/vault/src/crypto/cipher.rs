//! AES-256-CBC encryption and decryption of text fields and binary blobs.
//!
//! Every encrypt call draws a fresh 128-bit IV from the OS CSPRNG. IVs are
//! never derived from a counter or from the input, so two envelopes never
//! share an IV under the same key.

use std::{fs, path::Path, sync::Arc};

use aes::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use aes::Aes256;
use common::envelope::{Envelope, IV_LEN};
use rand::{rngs::OsRng, RngCore};

use super::error::{BlobIoError, CipherError, DecryptionError, EnvelopeField, InputError};
use super::key::KeyMaterial;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Encrypts and decrypts individual values under one process-wide key.
///
/// Cheap to clone; the key sits behind an [`Arc`] and is never mutated, so a
/// single instance may be used from any number of threads at once.
#[derive(Clone, Debug)]
pub struct FieldCipher {
    key: Arc<KeyMaterial>,
}

impl FieldCipher {
    /// Create a cipher that owns `key` for its lifetime.
    pub fn new(key: KeyMaterial) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Encrypt the UTF-8 bytes of a text field.
    pub fn encrypt_text(&self, plaintext: &str) -> Envelope {
        self.encrypt_blob(plaintext.as_bytes())
    }

    /// Decrypt a text field.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Input`] if either envelope field is absent or
    /// malformed (checked before any cipher work), and
    /// [`CipherError::Decryption`] on a block-length, padding, or UTF-8 failure.
    pub fn decrypt_text(&self, envelope: &Envelope) -> Result<String, CipherError> {
        let bytes = self.decrypt_blob(envelope)?;
        String::from_utf8(bytes).map_err(|_| DecryptionError::InvalidUtf8.into())
    }

    /// Encrypt an arbitrary byte payload.
    pub fn encrypt_blob(&self, bytes: &[u8]) -> Envelope {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(GenericArray::from_slice(self.key.as_bytes()), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(bytes);

        Envelope::new(hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt a byte payload.
    ///
    /// No content validation is performed on the recovered bytes.
    ///
    /// # Errors
    ///
    /// As for [`FieldCipher::decrypt_text`], minus the UTF-8 check.
    pub fn decrypt_blob(&self, envelope: &Envelope) -> Result<Vec<u8>, CipherError> {
        let (iv, ciphertext) = decode_envelope(envelope)?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(DecryptionError::BlockLength(ciphertext.len()).into());
        }

        Aes256CbcDec::new(GenericArray::from_slice(self.key.as_bytes()), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| DecryptionError::Padding.into())
    }

    /// Read an upload artifact in full and encrypt its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BlobIoError::Read`] if the file cannot be read.
    pub fn encrypt_file(&self, path: &Path) -> Result<Envelope, BlobIoError> {
        let bytes = fs::read(path).map_err(|source| BlobIoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.encrypt_blob(&bytes))
    }

    /// Decrypt a byte payload and write it to `destination`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns [`BlobIoError::Cipher`] if decryption fails (nothing is written)
    /// and [`BlobIoError::Write`] if the destination cannot be written.
    pub fn decrypt_blob_to(&self, envelope: &Envelope, destination: &Path) -> Result<(), BlobIoError> {
        let bytes = self.decrypt_blob(envelope)?;
        fs::write(destination, bytes).map_err(|source| BlobIoError::Write {
            path: destination.to_path_buf(),
            source,
        })
    }
}

/// Validate and hex-decode both halves of an envelope.
///
/// Presence is checked before decoding: an absent IV must never fall through
/// to the cipher as an all-zero IV.
fn decode_envelope(envelope: &Envelope) -> Result<([u8; IV_LEN], Vec<u8>), InputError> {
    if envelope.iv.is_empty() {
        return Err(InputError::MissingField(EnvelopeField::Iv));
    }
    if envelope.ciphertext.is_empty() {
        return Err(InputError::MissingField(EnvelopeField::Ciphertext));
    }

    let iv_bytes =
        hex::decode(&envelope.iv).map_err(|_| InputError::InvalidHex(EnvelopeField::Iv))?;
    let iv: [u8; IV_LEN] = iv_bytes
        .as_slice()
        .try_into()
        .map_err(|_| InputError::InvalidIvLength(iv_bytes.len()))?;

    let ciphertext = hex::decode(&envelope.ciphertext)
        .map_err(|_| InputError::InvalidHex(EnvelopeField::Ciphertext))?;

    Ok((iv, ciphertext))
}
