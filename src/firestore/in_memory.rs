use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use crate::firestore::document::{
    DocumentPath, DocumentSnapshot, DocumentStore, SnapshotCallback, SnapshotErrorCallback,
};
use crate::firestore::error::{invalid_argument, permission_denied, unavailable, FirestoreResult};
use crate::util::{ListenerSet, Subscription};

type PathListener = (DocumentPath, SnapshotCallback);

#[derive(Clone, Debug)]
struct StoredDocument {
    data: JsonValue,
    update_time: String,
}

/// Process-local document store with synchronous push delivery, used in tests and offline demos.
///
/// Every listener attached to a path receives the current snapshot when it attaches and a new
/// snapshot after each write to that path, before `set_document` returns.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: Mutex<HashMap<DocumentPath, StoredDocument>>,
    listeners: ListenerSet<PathListener>,
    version: AtomicU64,
    offline: AtomicBool,
    read_only: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every read and write fails with `firestore/unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// While read-only, reads succeed and every write fails with `firestore/permission-denied`,
    /// like a project whose security rules deny writes.
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Current contents of `path` without going through the async API.
    pub fn peek(&self, path: &DocumentPath) -> Option<JsonValue> {
        self.documents()
            .get(path)
            .map(|document| document.data.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentPath, StoredDocument>> {
        self.inner
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> FirestoreResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(unavailable("The in-memory document store is offline"))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self, path: &DocumentPath) -> DocumentSnapshot {
        match self.documents().get(path) {
            Some(document) => DocumentSnapshot::new(
                path.clone(),
                Some(document.data.clone()),
                Some(document.update_time.clone()),
            ),
            None => DocumentSnapshot::missing(path.clone()),
        }
    }

    fn next_update_time(&self) -> String {
        // Distinct even when two writes land in the same microsecond.
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        format!("{now}#{version}")
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(&self, path: &DocumentPath) -> FirestoreResult<DocumentSnapshot> {
        self.check_online()?;
        Ok(self.snapshot(path))
    }

    async fn set_document(&self, path: &DocumentPath, data: &JsonValue) -> FirestoreResult<()> {
        self.check_online()?;
        if self.inner.read_only.load(Ordering::SeqCst) {
            return Err(permission_denied("Missing or insufficient permissions."));
        }
        if !data.is_object() {
            return Err(invalid_argument("Document data must be a JSON object"));
        }
        let stored = StoredDocument {
            data: data.clone(),
            update_time: self.next_update_time(),
        };
        self.documents().insert(path.clone(), stored);

        let snapshot = self.snapshot(path);
        for (listener_path, listener) in self.inner.listeners.snapshot() {
            if &listener_path == path {
                listener(snapshot.clone());
            }
        }
        Ok(())
    }

    fn listen(
        &self,
        path: &DocumentPath,
        on_next: SnapshotCallback,
        on_error: SnapshotErrorCallback,
    ) -> Subscription {
        if let Err(err) = self.check_online() {
            on_error(&err);
        } else {
            on_next(self.snapshot(path));
        }
        self.inner.listeners.insert((path.clone(), on_next))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::firestore::error::{FirestoreError, FirestoreErrorCode};
    use serde_json::json;

    fn shared_path() -> DocumentPath {
        DocumentPath::new("studymate", "shared_data")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn writes_are_pushed_to_matching_listeners() {
        let store = InMemoryDocumentStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.listen(
            &shared_path(),
            Arc::new(move |snapshot: DocumentSnapshot| {
                sink.lock().unwrap().push(snapshot.into_data());
            }),
            Arc::new(|_: &FirestoreError| {}),
        );

        store
            .set_document(&shared_path(), &json!({"tasks": []}))
            .await
            .unwrap();
        store
            .set_document(&DocumentPath::new("other", "doc"), &json!({"x": 1}))
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some(json!({"tasks": []}))]
        );

        drop(subscription);
        assert_eq!(store.listener_count(), 0);
        store
            .set_document(&shared_path(), &json!({"tasks": [1]}))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn offline_store_fails_reads_and_writes() {
        let store = InMemoryDocumentStore::new();
        store.set_offline(true);

        let err = store.get_document(&shared_path()).await.unwrap_err();
        assert_eq!(err.code, FirestoreErrorCode::Unavailable);
        assert!(store.set_document(&shared_path(), &json!({})).await.is_err());

        store.set_offline(false);
        store.set_document(&shared_path(), &json!({"a": 1})).await.unwrap();
        let snapshot = store.get_document(&shared_path()).await.unwrap();
        assert_eq!(snapshot.data(), Some(&json!({"a": 1})));
        assert!(snapshot.update_time().is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn read_only_store_serves_reads_and_denies_writes() {
        let store = InMemoryDocumentStore::new();
        store.set_document(&shared_path(), &json!({"a": 1})).await.unwrap();
        store.set_read_only(true);

        let snapshot = store.get_document(&shared_path()).await.unwrap();
        assert_eq!(snapshot.data(), Some(&json!({"a": 1})));
        let err = store
            .set_document(&shared_path(), &json!({"a": 2}))
            .await
            .unwrap_err();
        assert_eq!(err.code, FirestoreErrorCode::PermissionDenied);
        assert_eq!(store.peek(&shared_path()), Some(json!({"a": 1})));
    }
}
