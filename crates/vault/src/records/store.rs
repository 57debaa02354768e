//! [`RecordStore`]: thread-safe in-memory table of encrypted records.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::SensitiveRecord;

/// Shared store of [`SensitiveRecord`]s keyed by id.
///
/// Wraps an `Arc<RwLock<IndexMap<..>>>` so that concurrent readers never
/// contend with each other, and a read-modify-write in [`RecordStore::modify`]
/// happens under one write lock. Records keep their insertion order.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    inner: Arc<RwLock<IndexMap<Uuid, SensitiveRecord>>>,
}

impl RecordStore {
    /// Create a new, empty [`RecordStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.inner.read().await.contains_key(&id)
    }

    /// Insert a record, replacing any existing record with the same id.
    pub async fn insert(&self, record: SensitiveRecord) {
        self.inner.write().await.insert(record.id, record);
    }

    /// A copy of the record with `id`, if present.
    pub async fn get(&self, id: Uuid) -> Option<SensitiveRecord> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Copies of every record, oldest first.
    pub async fn list(&self) -> Vec<SensitiveRecord> {
        self.inner.read().await.values().cloned().collect()
    }

    /// Apply `f` to the record with `id` under the write lock and return the
    /// updated copy, or `None` if no such record exists.
    pub async fn modify<F>(&self, id: Uuid, f: F) -> Option<SensitiveRecord>
    where
        F: FnOnce(&mut SensitiveRecord),
    {
        let mut lock = self.inner.write().await;
        let record = lock.get_mut(&id)?;
        f(record);
        Some(record.clone())
    }

    /// Remove and return the record with `id`, keeping the order of the rest.
    pub async fn remove(&self, id: Uuid) -> Option<SensitiveRecord> {
        self.inner.write().await.shift_remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Envelope;

    fn record(id: Uuid) -> SensitiveRecord {
        SensitiveRecord {
            id,
            full_name: Envelope::new("00".repeat(16), "11".repeat(16)),
            address: Envelope::default(),
            phone_number: Envelope::default(),
            email: Envelope::default(),
            date_of_birth: "1990-01-01".into(),
            image: Envelope::default(),
            image_url: "/images/x".into(),
        }
    }

    #[tokio::test]
    async fn initially_empty() {
        let store = RecordStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn insert_and_retrieve() {
        let store = RecordStore::new();
        let id = Uuid::new_v4();
        store.insert(record(id)).await;
        assert!(store.contains(id).await);
        assert_eq!(store.get(id).await.unwrap(), record(id));
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn modify_updates_in_place() {
        let store = RecordStore::new();
        let id = Uuid::new_v4();
        store.insert(record(id)).await;
        let updated = store
            .modify(id, |r| r.date_of_birth = "2000-02-02".into())
            .await
            .unwrap();
        assert_eq!(updated.date_of_birth, "2000-02-02");
        assert_eq!(store.get(id).await.unwrap().date_of_birth, "2000-02-02");
    }

    #[tokio::test]
    async fn modify_unknown_id_is_none() {
        let store = RecordStore::new();
        assert!(store.modify(Uuid::new_v4(), |_| {}).await.is_none());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = RecordStore::new();
        let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            store.insert(record(*id)).await;
        }
        store.remove(ids[3]).await;

        let listed: Vec<Uuid> = store.list().await.iter().map(|r| r.id).collect();
        let expected: Vec<Uuid> = ids.iter().copied().filter(|id| *id != ids[3]).collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn remove_deletes_record() {
        let store = RecordStore::new();
        let id = Uuid::new_v4();
        store.insert(record(id)).await;
        assert!(store.remove(id).await.is_some());
        assert!(store.remove(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }
}
