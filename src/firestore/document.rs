use std::fmt;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::DocumentLocation;
use crate::firestore::error::{FirestoreError, FirestoreResult};
use crate::util::{ErrorFn, NextFn, Subscription};

/// `collection/document` address of a single top-level document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: String,
    document_id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            document_id: document_id.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn canonical_string(&self) -> String {
        format!("{}/{}", self.collection, self.document_id)
    }
}

impl From<&DocumentLocation> for DocumentPath {
    fn from(location: &DocumentLocation) -> Self {
        Self::new(location.collection.clone(), location.document_id.clone())
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// Result of reading one document. `data` is `None` when the document does not exist.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    path: DocumentPath,
    data: Option<JsonValue>,
    update_time: Option<String>,
}

impl DocumentSnapshot {
    pub fn new(path: DocumentPath, data: Option<JsonValue>, update_time: Option<String>) -> Self {
        Self {
            path,
            data,
            update_time,
        }
    }

    pub fn missing(path: DocumentPath) -> Self {
        Self::new(path, None, None)
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&JsonValue> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<JsonValue> {
        self.data
    }

    /// Server-assigned write time (RFC 3339) of the stored version.
    pub fn update_time(&self) -> Option<&str> {
        self.update_time.as_deref()
    }
}

pub type SnapshotCallback = NextFn<DocumentSnapshot>;
pub type SnapshotErrorCallback = ErrorFn<FirestoreError>;

/// A hosted document database reduced to whole-document get, overwrite and listen.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get_document(&self, path: &DocumentPath) -> FirestoreResult<DocumentSnapshot>;

    /// Replaces the whole document with `data`, creating it when absent.
    async fn set_document(&self, path: &DocumentPath, data: &JsonValue) -> FirestoreResult<()>;

    /// Delivers the current snapshot and every later change until the returned handle is
    /// dropped. Listener failures go to `on_error`; delivery continues afterwards.
    fn listen(
        &self,
        path: &DocumentPath,
        on_next: SnapshotCallback,
        on_error: SnapshotErrorCallback,
    ) -> Subscription;
}
