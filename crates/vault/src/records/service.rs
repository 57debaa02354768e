//! [`RecordService`]: per-attribute encryption orchestration over the store.

use std::{fs, io, path::PathBuf, sync::Arc};

use common::{protocol::RecordView, Envelope, ServiceError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{Attribute, NewRecord, RecordPatch, SensitiveRecord};
use super::store::RecordStore;
use crate::crypto::{BlobIoError, CipherError, FieldCipher};
use crate::images::{ImageHost, ImageHostError};

/// Errors produced by the record service.
///
/// Cipher failures name the attribute that failed but never include its
/// ciphertext or any key material.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A required attribute is missing or blank.
    #[error("{0} must not be empty")]
    EmptyField(Attribute),

    /// An update carried no attributes at all.
    #[error("update contains no attributes")]
    EmptyPatch,

    /// No record exists with this id.
    #[error("record {0} not found")]
    NotFound(Uuid),

    /// A stored attribute could not be decrypted.
    #[error("failed to decrypt {field} of record {id}")]
    Decrypt {
        id: Uuid,
        field: Attribute,
        #[source]
        source: CipherError,
    },

    /// The stored portrait could not be decrypted to its destination file.
    #[error("failed to restore portrait of record {id}")]
    RestoreImage {
        id: Uuid,
        #[source]
        source: BlobIoError,
    },

    /// The image host rejected the portrait.
    #[error("failed to publish portrait")]
    PublishImage(#[from] ImageHostError),
}

impl From<RecordError> for ServiceError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::EmptyField(_) | RecordError::EmptyPatch => {
                ServiceError::BadRequest(e.to_string())
            }
            RecordError::NotFound(_) => ServiceError::NotFound(e.to_string()),
            RecordError::Decrypt { .. } | RecordError::RestoreImage { .. } => {
                ServiceError::EncryptionFailure(e.to_string())
            }
            RecordError::PublishImage(_) => ServiceError::Internal(e.to_string()),
        }
    }
}

/// Encrypted replacements for the attributes carried by one update.
#[derive(Default)]
struct Changes {
    full_name: Option<Envelope>,
    address: Option<Envelope>,
    phone_number: Option<Envelope>,
    email: Option<Envelope>,
    date_of_birth: Option<String>,
    image: Option<(Envelope, String)>,
}

impl Changes {
    fn attributes(&self) -> Vec<Attribute> {
        [
            (Attribute::FullName, self.full_name.is_some()),
            (Attribute::DateOfBirth, self.date_of_birth.is_some()),
            (Attribute::Address, self.address.is_some()),
            (Attribute::PhoneNumber, self.phone_number.is_some()),
            (Attribute::Email, self.email.is_some()),
            (Attribute::Image, self.image.is_some()),
        ]
        .into_iter()
        .filter_map(|(attr, present)| present.then_some(attr))
        .collect()
    }

    fn apply(self, record: &mut SensitiveRecord) {
        if let Some(env) = self.full_name {
            record.full_name = env;
        }
        if let Some(env) = self.address {
            record.address = env;
        }
        if let Some(env) = self.phone_number {
            record.phone_number = env;
        }
        if let Some(env) = self.email {
            record.email = env;
        }
        if let Some(dob) = self.date_of_birth {
            record.date_of_birth = dob;
        }
        if let Some((env, url)) = self.image {
            record.image = env;
            record.image_url = url;
        }
    }
}

/// Creates, reads, updates and deletes records, encrypting every sensitive
/// attribute independently on the way in and decrypting on the way out.
#[derive(Clone)]
pub struct RecordService {
    cipher: FieldCipher,
    store: RecordStore,
    images: Arc<dyn ImageHost>,
    decrypted_dir: PathBuf,
}

impl RecordService {
    /// `decrypted_dir` must already exist; single-record reads write the
    /// decrypted portrait there.
    pub fn new(
        cipher: FieldCipher,
        store: RecordStore,
        images: Arc<dyn ImageHost>,
        decrypted_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cipher,
            store,
            images,
            decrypted_dir: decrypted_dir.into(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Validate, encrypt and store a new record.
    ///
    /// Produces five independent envelopes: one per text attribute and one for
    /// the portrait.
    ///
    /// # Errors
    ///
    /// [`RecordError::EmptyField`] if any attribute is blank;
    /// [`RecordError::PublishImage`] if the image host fails.
    pub async fn create(&self, new: NewRecord) -> Result<SensitiveRecord, RecordError> {
        if let Some(attr) = new.first_empty() {
            return Err(RecordError::EmptyField(attr));
        }

        let id = Uuid::new_v4();
        let image_url = self.images.publish(id, &new.image)?;

        let record = SensitiveRecord {
            id,
            full_name: self.cipher.encrypt_text(&new.full_name),
            address: self.cipher.encrypt_text(&new.address),
            phone_number: self.cipher.encrypt_text(&new.phone_number),
            email: self.cipher.encrypt_text(&new.email),
            date_of_birth: new.date_of_birth,
            image: self.cipher.encrypt_blob(&new.image),
            image_url,
        };
        self.store.insert(record.clone()).await;

        info!(record_id = %id, image_bytes = new.image.len(), "record created");
        Ok(record)
    }

    /// Decrypt the text attributes of every stored record.
    ///
    /// Portraits are not decrypted; each view carries the hosted URL only.
    ///
    /// # Errors
    ///
    /// [`RecordError::Decrypt`] on the first attribute that fails.
    pub async fn list(&self) -> Result<Vec<RecordView>, RecordError> {
        let records = self.store.list().await;
        records.iter().map(|record| self.decrypt_view(record)).collect()
    }

    /// Decrypt one record, writing its portrait to `<decrypted_dir>/<id>`.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`], [`RecordError::Decrypt`], or
    /// [`RecordError::RestoreImage`].
    pub async fn get(&self, id: Uuid) -> Result<RecordView, RecordError> {
        let record = self.store.get(id).await.ok_or(RecordError::NotFound(id))?;
        let mut view = self.decrypt_view(&record)?;

        let destination = self.decrypted_dir.join(id.to_string());
        self.cipher
            .decrypt_blob_to(&record.image, &destination)
            .map_err(|source| {
                warn!(record_id = %id, field = %Attribute::Image, error = %source, "portrait restore failed");
                RecordError::RestoreImage { id, source }
            })?;

        view.image_path = Some(destination.display().to_string());
        Ok(view)
    }

    /// Re-encrypt only the attributes present in `patch`.
    ///
    /// Each present attribute gets a fresh envelope; absent attributes keep
    /// their stored envelope. Returns the updated record and the attributes
    /// that were written.
    ///
    /// # Errors
    ///
    /// [`RecordError::EmptyPatch`] or [`RecordError::EmptyField`] for invalid
    /// input, [`RecordError::NotFound`] for an unknown id, and
    /// [`RecordError::PublishImage`] if a replacement portrait cannot be published.
    pub async fn update(
        &self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<(SensitiveRecord, Vec<Attribute>), RecordError> {
        if patch.is_empty() {
            return Err(RecordError::EmptyPatch);
        }
        if let Some(attr) = patch.first_empty() {
            return Err(RecordError::EmptyField(attr));
        }
        if !self.store.contains(id).await {
            return Err(RecordError::NotFound(id));
        }

        let changes = self.encrypt_changes(id, patch)?;
        let written = changes.attributes();
        let record = self.apply_changes(id, changes).await?;

        info!(record_id = %id, fields = ?written.iter().map(|a| a.as_str()).collect::<Vec<_>>(), "record updated");
        Ok((record, written))
    }

    /// Delete a record along with its restored and hosted portrait files.
    ///
    /// File cleanup is best effort: failures are logged, and the record is
    /// gone either way.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] if no such record exists.
    pub async fn delete(&self, id: Uuid) -> Result<(), RecordError> {
        self.store.remove(id).await.ok_or(RecordError::NotFound(id))?;
        self.discard_restored_portrait(id);
        self.discard_hosted_portrait(id);
        info!(record_id = %id, "record deleted");
        Ok(())
    }

    /// Write `changes` into the stored record. If the record vanished after
    /// a replacement portrait was published, the published copy is dropped.
    async fn apply_changes(&self, id: Uuid, changes: Changes) -> Result<SensitiveRecord, RecordError> {
        let published = changes.image.is_some();
        match self.store.modify(id, |record| changes.apply(record)).await {
            Some(record) => Ok(record),
            None => {
                if published {
                    self.discard_hosted_portrait(id);
                }
                Err(RecordError::NotFound(id))
            }
        }
    }

    fn discard_restored_portrait(&self, id: Uuid) {
        let path = self.decrypted_dir.join(id.to_string());
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(record_id = %id, path = %path.display(), error = %e, "failed to remove restored portrait");
            }
        }
    }

    fn discard_hosted_portrait(&self, id: Uuid) {
        if let Err(e) = self.images.remove(id) {
            warn!(record_id = %id, error = %e, "failed to remove hosted portrait");
        }
    }

    fn encrypt_changes(&self, id: Uuid, patch: RecordPatch) -> Result<Changes, RecordError> {
        let encrypt = |value: Option<String>| value.map(|v| self.cipher.encrypt_text(&v));

        let image = match patch.image {
            Some(bytes) => {
                let url = self.images.publish(id, &bytes)?;
                Some((self.cipher.encrypt_blob(&bytes), url))
            }
            None => None,
        };

        Ok(Changes {
            full_name: encrypt(patch.full_name),
            address: encrypt(patch.address),
            phone_number: encrypt(patch.phone_number),
            email: encrypt(patch.email),
            date_of_birth: patch.date_of_birth,
            image,
        })
    }

    fn decrypt_view(&self, record: &SensitiveRecord) -> Result<RecordView, RecordError> {
        let decrypt = |field: Attribute, env: &Envelope| {
            self.cipher.decrypt_text(env).map_err(|source| {
                warn!(record_id = %record.id, field = %field, error = %source, "field decryption failed");
                RecordError::Decrypt {
                    id: record.id,
                    field,
                    source,
                }
            })
        };

        Ok(RecordView {
            id: record.id,
            full_name: decrypt(Attribute::FullName, &record.full_name)?,
            date_of_birth: record.date_of_birth.clone(),
            address: decrypt(Attribute::Address, &record.address)?,
            phone_number: decrypt(Attribute::PhoneNumber, &record.phone_number)?,
            email: decrypt(Attribute::Email, &record.email)?,
            image_url: record.image_url.clone(),
            image_path: None,
        })
    }
}
