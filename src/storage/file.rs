use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::StorageError;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: PathBuf::from("connect4_data"),
        }
    }
}

/// One JSON file per key under a data directory.
///
/// Writes go to `<key>.json.tmp` first and are renamed into place, so a
/// crash mid-write never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| StorageError::Unavailable {
                path: config.data_dir.clone(),
                source: e,
            })?;
        Ok(FileStore {
            dir: config.data_dir.clone(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&StorageConfig {
            data_dir: dir.path().join("data"),
        })
        .unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_directory() {
        let (_dir, store) = open_temp();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_set_get_remove() {
        let (_dir, store) = open_temp();
        assert_eq!(store.get("stats").unwrap(), None);

        store.set("stats", "{\"wins\":1}").unwrap();
        assert_eq!(store.get("stats").unwrap().as_deref(), Some("{\"wins\":1}"));
        assert!(store.dir().join("stats.json").exists());
        assert!(!store.dir().join("stats.json.tmp").exists());

        store.remove("stats").unwrap();
        assert_eq!(store.get("stats").unwrap(), None);
        // Idempotent
        store.remove("stats").unwrap();
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (_dir, store) = open_temp();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: dir.path().to_path_buf(),
        };
        FileStore::open(&config).unwrap().set("k", "v").unwrap();
        let reopened = FileStore::open(&config).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_open_reports_io_cause() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = FileStore::open(&StorageConfig {
            data_dir: blocker.join("data"),
        })
        .unwrap_err();
        match &err {
            StorageError::Unavailable { path, source } => {
                assert_eq!(path, &blocker.join("data"));
                assert!(std::error::Error::source(&err).is_some());
                assert!(err.to_string().contains(&source.to_string()));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }
}
