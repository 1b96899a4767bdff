use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::error::{io_error, LocalStorageResult};
use super::KeyValueStorage;

/// Storage backed by a directory, one file per key. Writes land in a temporary sibling first
/// and are renamed into place, so a crash never leaves a half-written value behind.
#[derive(Clone, Debug)]
pub struct FileKeyValueStorage {
    dir: PathBuf,
}

impl FileKeyValueStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name = utf8_percent_encode(key, NON_ALPHANUMERIC).to_string();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStorage for FileKeyValueStorage {
    fn get_item(&self, key: &str) -> LocalStorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(format!("Failed to read '{key}': {err}"))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> LocalStorageResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| io_error(format!("Failed to create storage directory: {err}")))?;

        let target = self.path_for(key);
        let temp = target.with_extension("json.tmp");
        let mut file = fs::File::create(&temp)
            .map_err(|err| io_error(format!("Failed to create '{}': {err}", temp.display())))?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|err| io_error(format!("Failed to write '{key}': {err}")))?;
        drop(file);

        fs::rename(&temp, &target)
            .map_err(|err| io_error(format!("Failed to move '{key}' into place: {err}")))
    }

    fn remove_item(&self, key: &str) -> LocalStorageResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(format!("Failed to remove '{key}': {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("studymate-local-test-{}-{}", name, std::process::id()));
        path
    }

    #[test]
    fn roundtrip_through_files() {
        let dir = temp_dir("roundtrip");
        let storage = FileKeyValueStorage::new(&dir);

        assert_eq!(storage.get_item("studymate_shared_data").unwrap(), None);
        storage.set_item("studymate_shared_data", "{\"tasks\":[]}").unwrap();
        storage.set_item("studymate_shared_data", "{\"tasks\":[1]}").unwrap();
        assert_eq!(
            storage.get_item("studymate_shared_data").unwrap().as_deref(),
            Some("{\"tasks\":[1]}")
        );

        storage.remove_item("studymate_shared_data").unwrap();
        storage.remove_item("studymate_shared_data").unwrap();
        assert_eq!(storage.get_item("studymate_shared_data").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn keys_are_escaped_into_file_names() {
        let storage = FileKeyValueStorage::new("/tmp/unused");
        let path = storage.path_for("../etc/passwd");
        assert_eq!(path.parent(), Some(Path::new("/tmp/unused")));
    }
}
