use std::sync::{Arc, LazyLock};

use async_lock::Mutex as AsyncMutex;
use async_trait::async_trait;

use crate::config::PersistenceMode;
use crate::firestore::{
    DocumentPath, DocumentSnapshot, DocumentStore, FirestoreError, FirestoreResult,
};
use crate::local::LocalAdapter;
use crate::logger::Logger;
use crate::model::{generate_id, merge_with_defaults, AppData, FileItem, FILE_TYPE_IMAGE};
use crate::storage::{blob_path, BlobStore, ImageUpload};
use crate::sync::context::StudyMateContext;
use crate::util::{NextFn, Subscription};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/sync"));

/// One persistence strategy. Every operation degrades instead of failing.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SyncBackend: Send + Sync + 'static {
    fn mode(&self) -> PersistenceMode;

    async fn load(&self) -> AppData;

    async fn save(&self, data: &AppData);

    /// Pushes every externally written version of the document to `callback`.
    fn subscribe(&self, callback: NextFn<AppData>) -> Subscription;

    async fn upload_image(&self, upload: ImageUpload, folder_id: Option<&str>) -> FileItem;

    async fn delete_image(&self, file: &FileItem);
}

pub type SyncBackendHandle = Arc<dyn SyncBackend>;

/// Picks the strategy matching the context's mode.
pub fn backend_for(context: &StudyMateContext) -> SyncBackendHandle {
    match context.document_store() {
        Some(documents) => Arc::new(RemoteBackedBackend::new(
            context.local().clone(),
            Arc::clone(documents),
            context.document_path(),
            context.blob_store().cloned(),
            context.config().storage_namespace.clone(),
        )),
        None => Arc::new(LocalOnlyBackend::new(context.local().clone())),
    }
}

fn inline_file_item(id: String, upload: &ImageUpload) -> FileItem {
    FileItem {
        id,
        name: upload.name.clone(),
        kind: FILE_TYPE_IMAGE.to_owned(),
        url: upload.to_data_url(),
        storage_path: None,
    }
}

/// Local key-value storage only; there is no push channel, callers poll.
#[derive(Clone, Debug)]
pub struct LocalOnlyBackend {
    local: LocalAdapter,
}

impl LocalOnlyBackend {
    pub fn new(local: LocalAdapter) -> Self {
        Self { local }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SyncBackend for LocalOnlyBackend {
    fn mode(&self) -> PersistenceMode {
        PersistenceMode::LocalOnly
    }

    async fn load(&self) -> AppData {
        self.local.load()
    }

    async fn save(&self, data: &AppData) {
        self.local.save(data);
    }

    fn subscribe(&self, _callback: NextFn<AppData>) -> Subscription {
        Subscription::noop()
    }

    async fn upload_image(&self, upload: ImageUpload, _folder_id: Option<&str>) -> FileItem {
        inline_file_item(generate_id(), &upload)
    }

    async fn delete_image(&self, _file: &FileItem) {}
}

/// Hosted document store first, with local storage as write-through cache and fallback.
pub struct RemoteBackedBackend {
    local: LocalAdapter,
    documents: Arc<dyn DocumentStore>,
    path: DocumentPath,
    blobs: Option<Arc<dyn BlobStore>>,
    namespace: String,
    // Keeps the local and remote halves of concurrent saves in the same order.
    save_lock: AsyncMutex<()>,
}

impl RemoteBackedBackend {
    pub fn new(
        local: LocalAdapter,
        documents: Arc<dyn DocumentStore>,
        path: DocumentPath,
        blobs: Option<Arc<dyn BlobStore>>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            local,
            documents,
            path,
            blobs,
            namespace: namespace.into(),
            save_lock: AsyncMutex::new(()),
        }
    }

    /// Creates the missing shared document with the default contents.
    async fn seed_defaults(&self) -> FirestoreResult<AppData> {
        let defaults = AppData::default();
        let value = serde_json::to_value(&defaults)?;
        self.documents.set_document(&self.path, &value).await?;
        LOGGER.info(format!("created {} with default contents", self.path));
        Ok(defaults)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SyncBackend for RemoteBackedBackend {
    fn mode(&self) -> PersistenceMode {
        PersistenceMode::RemoteBacked
    }

    async fn load(&self) -> AppData {
        let loaded = match self.documents.get_document(&self.path).await {
            Ok(snapshot) => match snapshot.into_data() {
                Some(raw) => Ok(merge_with_defaults(&raw)),
                None => self.seed_defaults().await,
            },
            Err(err) => Err(err),
        };
        loaded.unwrap_or_else(|err| {
            let reason = if err.is_transient() { "unreachable" } else { "rejected the request" };
            LOGGER.warn(format!("remote store {reason}, using local storage: {err}"));
            self.local.load()
        })
    }

    async fn save(&self, data: &AppData) {
        let _guard = self.save_lock.lock().await;
        self.local.save(data);

        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                LOGGER.warn(format!("could not encode document for remote save: {err}"));
                return;
            }
        };
        if let Err(err) = self.documents.set_document(&self.path, &value).await {
            LOGGER.warn(format!("remote save failed: {err}"));
        }
    }

    fn subscribe(&self, callback: NextFn<AppData>) -> Subscription {
        let local = self.local.clone();
        let on_next = Arc::new(move |snapshot: DocumentSnapshot| {
            if let Some(raw) = snapshot.data() {
                let merged = merge_with_defaults(raw);
                local.save(&merged);
                callback(merged);
            }
        });
        let on_error = Arc::new(|err: &FirestoreError| {
            LOGGER.warn(format!("remote listener error: {err}"));
        });
        self.documents.listen(&self.path, on_next, on_error)
    }

    async fn upload_image(&self, upload: ImageUpload, folder_id: Option<&str>) -> FileItem {
        let file_id = generate_id();
        let Some(blobs) = self.blobs.as_ref() else {
            return inline_file_item(file_id, &upload);
        };

        let path = blob_path(&self.namespace, folder_id, &file_id, &upload.name);
        let content_type = upload.effective_content_type().to_owned();
        match blobs.upload(&path, upload.bytes.clone(), &content_type).await {
            Ok(blob) => FileItem {
                id: file_id,
                name: upload.name,
                kind: FILE_TYPE_IMAGE.to_owned(),
                url: blob.download_url,
                storage_path: Some(blob.path),
            },
            Err(err) => {
                LOGGER.warn(format!("upload failed, storing inline: {err}"));
                inline_file_item(file_id, &upload)
            }
        }
    }

    async fn delete_image(&self, file: &FileItem) {
        let (Some(blobs), Some(path)) = (self.blobs.as_ref(), file.storage_path.as_deref()) else {
            return;
        };
        match blobs.delete(path).await {
            Ok(()) => LOGGER.debug(format!("deleted {path} from the object store")),
            Err(err) => LOGGER.warn(format!("could not delete {path}: {err}")),
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::firestore::InMemoryDocumentStore;
    use crate::local::InMemoryKeyValueStorage;
    use crate::model::{NewTask, DEFAULT_SUBJECTS};
    use crate::storage::InMemoryBlobStore;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Mutex;

    struct Fixture {
        local: LocalAdapter,
        documents: InMemoryDocumentStore,
        blobs: InMemoryBlobStore,
        backend: RemoteBackedBackend,
    }

    fn fixture() -> Fixture {
        let local = LocalAdapter::new(Arc::new(InMemoryKeyValueStorage::new()));
        let documents = InMemoryDocumentStore::new();
        let blobs = InMemoryBlobStore::new();
        let backend = RemoteBackedBackend::new(
            local.clone(),
            Arc::new(documents.clone()),
            DocumentPath::new("studymate", "shared_data"),
            Some(Arc::new(blobs.clone())),
            "studymate",
        );
        Fixture {
            local,
            documents,
            blobs,
            backend,
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_remote_document_is_seeded() {
        let fx = fixture();
        let data = fx.backend.load().await;

        assert_eq!(data, AppData::default());
        let stored = fx.documents.peek(&fx.backend.path).unwrap();
        assert_eq!(stored["subjects"].as_array().unwrap().len(), DEFAULT_SUBJECTS.len());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn remote_documents_are_normalized() {
        let fx = fixture();
        fx.documents
            .set_document(&fx.backend.path, &json!({"tasks": [{"id": "1", "text": "Leer"}]}))
            .await
            .unwrap();

        let data = fx.backend.load().await;
        assert_eq!(data.tasks[0].text, "Leer");
        assert_eq!(data.subjects, DEFAULT_SUBJECTS);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn remote_failure_falls_back_to_local_copy() {
        let fx = fixture();
        let mut cached = AppData::default();
        cached.add_subject("Latín");
        fx.local.save(&cached);
        fx.documents.set_offline(true);

        assert_eq!(fx.backend.load().await, cached);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_seed_write_falls_back_to_local_copy() {
        let fx = fixture();
        let mut cached = AppData::default();
        cached.add_task(NewTask {
            text: "Entregar informe".into(),
            ..NewTask::default()
        });
        fx.local.save(&cached);
        fx.documents.set_read_only(true);

        assert_eq!(fx.backend.load().await, cached);
        assert!(fx.documents.peek(&fx.backend.path).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_remote_save_keeps_local_write() {
        let fx = fixture();
        fx.documents.set_offline(true);
        let mut data = AppData::default();
        data.add_folder("Apuntes");

        fx.backend.save(&data).await;

        assert_eq!(fx.local.load(), data);
        fx.documents.set_offline(false);
        assert!(fx.documents.peek(&fx.backend.path).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn pushes_refresh_local_cache_before_callback() {
        let fx = fixture();
        let local = fx.local.clone();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let _subscription = fx.backend.subscribe(Arc::new(move |data: AppData| {
            // The cache already holds the pushed version when the callback runs.
            sink.lock().unwrap().push((data.clone(), local.load() == data));
        }));

        fx.documents
            .set_document(&fx.backend.path, &json!({"subjects": ["Música"]}))
            .await
            .unwrap();

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].0.subjects, ["Música"]);
        assert!(observed[0].1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn uploads_go_to_namespaced_paths() {
        let fx = fixture();
        let folder_file = fx
            .backend
            .upload_image(ImageUpload::new("mapa.png", Bytes::from_static(b"png")), Some("77"))
            .await;
        let general_file = fx
            .backend
            .upload_image(ImageUpload::new("foto.jpg", Bytes::from_static(b"jpg")), None)
            .await;

        let folder_path = folder_file.storage_path.clone().unwrap();
        assert!(folder_path.starts_with("studymate/folders/77/"));
        assert!(folder_path.ends_with(&format!("{}_mapa.png", folder_file.id)));
        assert!(general_file
            .storage_path
            .as_deref()
            .unwrap()
            .starts_with("studymate/general/"));
        assert_eq!(fx.blobs.content_type(&folder_path).as_deref(), Some("image/png"));
        assert_eq!(folder_file.kind, "image");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_upload_falls_back_to_inline_data() {
        let fx = fixture();
        fx.blobs.set_offline(true);
        let file = fx
            .backend
            .upload_image(ImageUpload::new("a.png", Bytes::from_static(b"abc")), None)
            .await;

        assert_eq!(file.storage_path, None);
        assert_eq!(file.url, "data:image/png;base64,YWJj");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_only_backend_never_pushes() {
        let local = LocalAdapter::new(Arc::new(InMemoryKeyValueStorage::new()));
        let backend = LocalOnlyBackend::new(local);
        let subscription = backend.subscribe(Arc::new(|_: AppData| panic!("no pushes in local mode")));
        assert!(subscription.is_noop());

        let file = backend
            .upload_image(ImageUpload::new("x.gif", Bytes::from_static(b"GIF")), Some("1"))
            .await;
        assert!(file.is_inline());
        assert!(!file.is_remote());
    }
}
