//! Sensitive records: per-attribute encryption on write, decryption on read.
//!
//! # Invariants
//!
//! - Every sensitive attribute and the portrait get their own envelope and
//!   therefore their own freshly drawn IV. Envelopes are never shared or
//!   derived from one another.
//! - An update re-encrypts only the attributes it carries; the others keep
//!   their stored envelope untouched.
//! - Plaintext never reaches the store or the logs.

pub mod model;
pub mod service;
pub mod store;

pub use model::{Attribute, NewRecord, RecordPatch, SensitiveRecord};
pub use service::{RecordError, RecordService};
pub use store::RecordStore;
