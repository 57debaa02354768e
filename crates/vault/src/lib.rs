//! `pii-vault`: stores personal records with every sensitive attribute
//! encrypted at rest under a single AES-256 key.
//!
//! The field cipher in [`crypto`] is the core; [`records`], [`images`] and
//! [`server`] are the layers that call into it.

pub mod config;
pub mod crypto;
pub mod images;
pub mod records;
pub mod server;
pub mod telemetry;
