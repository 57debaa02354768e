//! [`ImageHost`] trait and its filesystem-backed implementation.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors produced by an image host.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// The host's storage could not be written.
    #[error("image host I/O failed at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Somewhere portraits can be published and later retrieved by URL.
#[cfg_attr(test, mockall::automock)]
pub trait ImageHost: Send + Sync {
    /// Publish `bytes` as the portrait of record `id` and return its URL.
    ///
    /// Publishing again for the same id replaces the previous portrait.
    fn publish(&self, id: Uuid, bytes: &[u8]) -> Result<String, ImageHostError>;

    /// Drop the published portrait of record `id`. Removing a portrait that
    /// was never published is not an error.
    fn remove(&self, id: Uuid) -> Result<(), ImageHostError>;
}

/// Writes portraits into a local directory served under `base_url`.
#[derive(Debug, Clone)]
pub struct DirectoryImageHost {
    root: PathBuf,
    base_url: String,
}

impl DirectoryImageHost {
    /// Create the host, creating `root` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ImageHostError::Io`] if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self, ImageHostError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ImageHostError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageHost for DirectoryImageHost {
    fn publish(&self, id: Uuid, bytes: &[u8]) -> Result<String, ImageHostError> {
        let path = self.root.join(id.to_string());
        fs::write(&path, bytes).map_err(|source| ImageHostError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(record_id = %id, bytes = bytes.len(), "portrait published");
        Ok(format!("{}/{id}", self.base_url))
    }

    fn remove(&self, id: Uuid) -> Result<(), ImageHostError> {
        let path = self.root.join(id.to_string());
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(record_id = %id, "portrait removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ImageHostError::Io { path, source }),
        }
    }
}
