use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::error::{quota_exceeded, LocalStorageResult};
use super::KeyValueStorage;

/// Process-local storage. An optional quota caps the summed size of all keys and values, in
/// bytes, mirroring the per-origin limit of browser storage.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn used_bytes(entries: &HashMap<String, String>, skip: &str) -> usize {
    entries
        .iter()
        .filter(|(key, _)| key.as_str() != skip)
        .map(|(key, value)| key.len() + value.len())
        .sum()
}

impl KeyValueStorage for InMemoryKeyValueStorage {
    fn get_item(&self, key: &str) -> LocalStorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> LocalStorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(quota) = self.quota {
            let needed = used_bytes(&entries, key) + key.len() + value.len();
            if needed > quota {
                return Err(quota_exceeded(format!(
                    "writing '{key}' needs {needed} bytes, quota is {quota}"
                )));
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> LocalStorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
