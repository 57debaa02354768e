//! `pii-vault` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables, decoding the
//!    encryption key. A missing or malformed key aborts startup.
//! 2. Initialise structured JSON logging.
//! 3. Prepare the image host and the decrypted-portrait directory.
//! 4. Build the field cipher and record service.
//! 5. Build the Axum router and start the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use vault::config::Config;
use vault::crypto::FieldCipher;
use vault::images::DirectoryImageHost;
use vault::records::{RecordService, RecordStore};
use vault::server::{self, state::AppState};
use vault::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "pii-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Collaborators
    // -----------------------------------------------------------------------
    let images = DirectoryImageHost::create(&cfg.image_dir, cfg.image_base_url.as_str())
        .context("failed to prepare image directory")?;
    std::fs::create_dir_all(&cfg.decrypted_dir)
        .with_context(|| format!("failed to create {}", cfg.decrypted_dir))?;

    // -----------------------------------------------------------------------
    // 4. Field cipher + record service
    // -----------------------------------------------------------------------
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let max_body_bytes = cfg.max_body_bytes;
    let cipher = FieldCipher::new(cfg.encryption_key);
    let records = RecordService::new(cipher, RecordStore::new(), Arc::new(images), cfg.decrypted_dir);

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(records), max_body_bytes);

    info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
