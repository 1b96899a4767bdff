use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use crate::storage::error::{internal_error, invalid_argument, object_not_found, StorageResult};
use crate::storage::{BlobStore, UploadedBlob};

#[derive(Clone, Debug)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
}

/// Object store held in process memory. Download URLs use the `memory://` scheme.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every upload and delete fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects().contains_key(path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects()
            .get(path)
            .map(|object| object.content_type.clone())
    }

    pub fn bytes(&self, path: &str) -> Option<Bytes> {
        self.objects().get(path).map(|object| object.bytes.clone())
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(internal_error("The in-memory object store is offline"))
        } else {
            Ok(())
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StorageResult<UploadedBlob> {
        self.check_online()?;
        if path.is_empty() {
            return Err(invalid_argument("Object path must not be empty."));
        }
        self.objects().insert(
            path.to_owned(),
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(UploadedBlob {
            path: path.to_owned(),
            download_url: format!("memory://{path}"),
        })
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        self.check_online()?;
        match self.objects().remove(path) {
            Some(_) => Ok(()),
            None => Err(object_not_found(path)),
        }
    }
}
