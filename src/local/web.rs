use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

use super::error::{quota_exceeded, unavailable, LocalStorageError, LocalStorageResult};
use super::KeyValueStorage;

/// `window.localStorage`, looked up on every call so the handle stays `Send + Sync`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebLocalStorage;

impl WebLocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> LocalStorageResult<Storage> {
        let window: Window = web_sys::window()
            .ok_or_else(|| unavailable("window object is not available in this environment"))?;
        window
            .local_storage()
            .map_err(map_js_error)?
            .ok_or_else(|| unavailable("Web storage API is unavailable"))
    }
}

impl KeyValueStorage for WebLocalStorage {
    fn get_item(&self, key: &str) -> LocalStorageResult<Option<String>> {
        Self::storage()?.get_item(key).map_err(map_js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> LocalStorageResult<()> {
        // Browsers report a full origin quota as a thrown DOMException.
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| quota_exceeded(describe(&err)))
    }

    fn remove_item(&self, key: &str) -> LocalStorageResult<()> {
        Self::storage()?.remove_item(key).map_err(map_js_error)
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .unwrap_or_else(|| "Unknown JavaScript error".to_string())
}

fn map_js_error(err: JsValue) -> LocalStorageError {
    unavailable(describe(&err))
}
