use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::config::{PersistenceMode, StudyMateConfig};
use crate::firestore::{DocumentPath, DocumentStore, HttpDocumentStore};
use crate::local::{default_storage, KeyValueStorageHandle, LocalAdapter};
use crate::logger::Logger;
use crate::storage::{BlobStore, HttpBlobStore};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/sync"));

/// Process-wide handles shared by every sync operation. Built once at startup.
///
/// The persistence mode follows from what was wired in: a context holding a document store is
/// remote-backed, anything else is local-only.
#[derive(Clone)]
pub struct StudyMateContext {
    config: StudyMateConfig,
    local: LocalAdapter,
    documents: Option<Arc<dyn DocumentStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl fmt::Debug for StudyMateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudyMateContext")
            .field("mode", &self.mode())
            .field("document", &self.document_path())
            .field("object_store", &self.blobs.is_some())
            .finish()
    }
}

impl StudyMateContext {
    /// Wires the REST clients when `config` carries remote credentials, with the platform's
    /// default local storage.
    pub fn from_config(config: StudyMateConfig) -> Self {
        Self::from_config_with_storage(config, default_storage())
    }

    pub fn from_config_with_storage(config: StudyMateConfig, storage: KeyValueStorageHandle) -> Self {
        let mut builder = StudyMateContextBuilder::new(config.clone()).with_storage(storage);

        if config.persistence_mode() == PersistenceMode::RemoteBacked {
            if let Some(store) = build_document_store(&config) {
                builder = builder.with_document_store(Arc::new(store));
                if let Some(blobs) = build_blob_store(&config) {
                    builder = builder.with_blob_store(Arc::new(blobs));
                }
            }
        }

        let context = builder.build();
        match context.mode() {
            PersistenceMode::RemoteBacked => LOGGER.info(format!(
                "remote persistence enabled for {}",
                context.document_path()
            )),
            PersistenceMode::LocalOnly => LOGGER.info("no remote credentials; using local storage only"),
        }
        context
    }

    pub fn builder(config: StudyMateConfig) -> StudyMateContextBuilder {
        StudyMateContextBuilder::new(config)
    }

    pub fn config(&self) -> &StudyMateConfig {
        &self.config
    }

    pub fn mode(&self) -> PersistenceMode {
        if self.documents.is_some() {
            PersistenceMode::RemoteBacked
        } else {
            PersistenceMode::LocalOnly
        }
    }

    pub fn local(&self) -> &LocalAdapter {
        &self.local
    }

    pub fn document_store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.documents.as_ref()
    }

    pub fn blob_store(&self) -> Option<&Arc<dyn BlobStore>> {
        self.blobs.as_ref()
    }

    pub fn document_path(&self) -> DocumentPath {
        DocumentPath::from(&self.config.document)
    }
}

pub struct StudyMateContextBuilder {
    config: StudyMateConfig,
    storage: Option<KeyValueStorageHandle>,
    documents: Option<Arc<dyn DocumentStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl StudyMateContextBuilder {
    pub fn new(config: StudyMateConfig) -> Self {
        Self {
            config,
            storage: None,
            documents: None,
            blobs: None,
        }
    }

    pub fn with_storage(mut self, storage: KeyValueStorageHandle) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(store);
        self
    }

    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(store);
        self
    }

    pub fn build(self) -> StudyMateContext {
        let storage = self.storage.unwrap_or_else(default_storage);
        let local = LocalAdapter::with_keys(
            storage,
            self.config.local_storage_key.clone(),
            self.config.theme_storage_key.clone(),
        );
        // An object store without a document store has nothing to attach URLs to.
        let blobs = self.documents.as_ref().and(self.blobs);
        StudyMateContext {
            config: self.config,
            local,
            documents: self.documents,
            blobs,
        }
    }
}

fn build_document_store(config: &StudyMateConfig) -> Option<HttpDocumentStore> {
    let project_id = config.firebase.project_id()?;
    let mut builder = HttpDocumentStore::builder(project_id)
        .with_watch_interval(config.remote_watch_interval);
    if let Some(api_key) = config.firebase.api_key() {
        builder = builder.with_api_key(api_key);
    }
    if let Some(host) = config.firestore_emulator_host.as_deref() {
        builder = builder.with_emulator_host(host);
    }
    match builder.build() {
        Ok(store) => Some(store),
        Err(err) => {
            LOGGER.warn(format!("remote document store unavailable: {err}"));
            None
        }
    }
}

fn build_blob_store(config: &StudyMateConfig) -> Option<HttpBlobStore> {
    let bucket = config.firebase.storage_bucket()?;
    let mut builder = HttpBlobStore::builder(bucket);
    if let Some(host) = config.storage_emulator_host.as_deref() {
        builder = builder.with_emulator_host(host);
    }
    match builder.build() {
        Ok(store) => Some(store),
        Err(err) => {
            LOGGER.warn(format!("remote object store unavailable: {err}"));
            None
        }
    }
}
