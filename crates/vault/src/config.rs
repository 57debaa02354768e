//! Configuration loading and validation for the pii-vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or
//! invalid. In particular a missing or malformed `ENCRYPTION_KEY` is fatal: the
//! service cannot serve a single request without it.

use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;

use crate::crypto::KeyMaterial;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte AES key. **Required.** Redacted in `Debug` output.
    pub encryption_key: KeyMaterial,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Directory the image host writes published portraits into.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// URL prefix returned for published portraits.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Directory decrypted portraits are written to on single-record reads.
    #[serde(default = "default_decrypted_dir")]
    pub decrypted_dir: String,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_image_dir() -> String {
    "images".into()
}
fn default_image_base_url() -> String {
    "/images".into()
}
fn default_decrypted_dir() -> String {
    "decrypted".into()
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed,
    /// including an encryption key that is not exactly 32 hex-encoded bytes.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder().add_source(config::Environment::default()))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration (is ENCRYPTION_KEY set to 64 hex chars?)")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.image_dir, "IMAGE_DIR")?;
        ensure_non_empty(&self.image_base_url, "IMAGE_BASE_URL")?;
        ensure_non_empty(&self.decrypted_dir, "DECRYPTED_DIR")?;

        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
