//! Shared application state injected into every Axum handler.

use crate::records::RecordService;

/// Application state shared across all request handlers.
///
/// Cheaply cloneable: the record service holds its store, cipher key and
/// image host behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Encrypting record service backing every `/records` route.
    pub records: RecordService,
}

impl AppState {
    /// Create a new [`AppState`] around the record service.
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }
}
