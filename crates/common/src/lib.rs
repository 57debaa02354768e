//! Common types, protocol definitions, and errors shared across `pii-vault` crates.

pub mod envelope;
pub mod error;
pub mod protocol;

pub use envelope::Envelope;
pub use error::ServiceError;
