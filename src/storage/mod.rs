//! Remote object store for uploaded images, plus the inline base64 fallback.

mod data_url;
pub mod error;
mod http;
mod in_memory;
mod path;

use async_trait::async_trait;
use bytes::Bytes;

pub use data_url::{guess_mime_type, to_data_url};
pub use error::{StorageError, StorageErrorCode, StorageResult};
pub use http::{HttpBlobStore, HttpBlobStoreBuilder};
pub use in_memory::InMemoryBlobStore;
pub use path::blob_path;

/// A stored object and the public URL it can be fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedBlob {
    pub path: String,
    pub download_url: String,
}

/// A file picked for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The declared content type, or one guessed from the file name.
    pub fn effective_content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| guess_mime_type(&self.name))
    }

    pub fn to_data_url(&self) -> String {
        to_data_url(&self.name, self.content_type.as_deref(), &self.bytes)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BlobStore: Send + Sync + 'static {
    async fn upload(&self, path: &str, bytes: Bytes, content_type: &str)
        -> StorageResult<UploadedBlob>;

    async fn delete(&self, path: &str) -> StorageResult<()>;
}
