//! Browser-style key-value storage and the Local Persistence Adapter built on it.
//!
//! [`LocalAdapter`] is both the offline store (local-only mode) and the write-through cache of
//! the remote document (remote-backed mode). Its reads never fail: missing or corrupt payloads
//! come back as the default document.

mod adapter;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
mod file;
mod memory;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
mod web;

use std::sync::Arc;

pub use adapter::LocalAdapter;
pub use error::{LocalStorageError, LocalStorageErrorCode, LocalStorageResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileKeyValueStorage;
pub use memory::InMemoryKeyValueStorage;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub use web::WebLocalStorage;

/// String key to string value storage, shaped like `window.localStorage`.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> LocalStorageResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> LocalStorageResult<()>;

    fn remove_item(&self, key: &str) -> LocalStorageResult<()>;
}

pub type KeyValueStorageHandle = Arc<dyn KeyValueStorage>;

/// The storage a fresh context uses when the caller does not pick one: the browser's
/// `localStorage` on wasm builds with `wasm-web`, process memory everywhere else.
pub fn default_storage() -> KeyValueStorageHandle {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        Arc::new(WebLocalStorage::new())
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        Arc::new(InMemoryKeyValueStorage::new())
    }
}
