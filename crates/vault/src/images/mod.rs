//! Publishing portraits to an image host.
//!
//! The record service hands each uploaded portrait to an [`ImageHost`] and
//! stores the returned URL next to the encrypted copy. Production uses
//! [`DirectoryImageHost`]; tests substitute a mock.

pub mod host;

pub use host::{DirectoryImageHost, ImageHost, ImageHostError};

#[cfg(test)]
pub use host::MockImageHost;
