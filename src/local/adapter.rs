use std::fmt;
use std::sync::LazyLock;

use serde_json::Value;

use crate::config::constants::{LOCAL_STORAGE_KEY, THEME_STORAGE_KEY};
use crate::local::error::{serialization_error, LocalStorageResult};
use crate::local::KeyValueStorageHandle;
use crate::logger::Logger;
use crate::model::{merge_with_defaults, AppData, Theme};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/local"));

/// Reads and writes the aggregate document under one fixed key.
#[derive(Clone)]
pub struct LocalAdapter {
    storage: KeyValueStorageHandle,
    data_key: String,
    theme_key: String,
}

impl fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("data_key", &self.data_key)
            .field("theme_key", &self.theme_key)
            .finish()
    }
}

impl LocalAdapter {
    pub fn new(storage: KeyValueStorageHandle) -> Self {
        Self::with_keys(storage, LOCAL_STORAGE_KEY, THEME_STORAGE_KEY)
    }

    pub fn with_keys(
        storage: KeyValueStorageHandle,
        data_key: impl Into<String>,
        theme_key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            data_key: data_key.into(),
            theme_key: theme_key.into(),
        }
    }

    pub fn storage(&self) -> &KeyValueStorageHandle {
        &self.storage
    }

    /// Returns the stored document normalized against the defaults. Missing, unreadable or
    /// corrupt payloads yield the default document.
    pub fn load(&self) -> AppData {
        match self.try_load() {
            Ok(Some(data)) => data,
            Ok(None) => AppData::default(),
            Err(err) => {
                LOGGER.error(format!("Error loading from localStorage: {err}"));
                AppData::default()
            }
        }
    }

    /// Like [`load`](Self::load) but surfaces failures and distinguishes "nothing stored".
    pub fn try_load(&self) -> LocalStorageResult<Option<AppData>> {
        let Some(raw) = self
            .storage
            .get_item(&self.data_key)?
            .filter(|raw| !raw.is_empty())
        else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&raw)
            .map_err(|err| serialization_error(format!("Stored document is not JSON: {err}")))?;
        Ok(Some(merge_with_defaults(&value)))
    }

    /// Writes the whole document. Failures (quota, unavailable storage) are logged and dropped.
    pub fn save(&self, data: &AppData) {
        if let Err(err) = self.try_save(data) {
            LOGGER.error(format!("Error saving to localStorage: {err}"));
        }
    }

    pub fn try_save(&self, data: &AppData) -> LocalStorageResult<()> {
        let serialized = serde_json::to_string(data)
            .map_err(|err| serialization_error(format!("Failed to serialize document: {err}")))?;
        self.storage.set_item(&self.data_key, &serialized)
    }

    /// Stored theme preference; unknown values read as no preference.
    pub fn theme(&self) -> Option<Theme> {
        match self.storage.get_item(&self.theme_key) {
            Ok(value) => value.as_deref().and_then(Theme::parse),
            Err(err) => {
                LOGGER.error(format!("Error reading theme preference: {err}"));
                None
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        if let Err(err) = self.storage.set_item(&self.theme_key, theme.as_str()) {
            LOGGER.error(format!("Error saving theme preference: {err}"));
        }
    }
}
