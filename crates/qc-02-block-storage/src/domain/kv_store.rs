//! The node's only concrete persistence collaborator: a key-value
//! snapshot store, one file per logical record (`node_id`, `keys`,
//! `chain`, `peers`), backing save/load of opaque byte blobs.

use std::fs;
use std::path::PathBuf;

use super::errors::StorageError;

/// Saves and loads opaque byte blobs keyed by a logical record name.
pub trait KvStore: Send + Sync {
    fn save(&self, kind: &str, bytes: &[u8]) -> Result<(), StorageError>;
    fn load(&self, kind: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

/// Filesystem-backed [`KvStore`]: `{data_dir}/{kind}` holds the latest
/// snapshot for that kind, overwritten whole on every `save`.
pub struct FileKvStore {
    data_dir: PathBuf,
}

impl FileKvStore {
    /// Open (creating if absent) a store rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::Io { data_dir: path_string(&data_dir), source })?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.data_dir.join(kind)
    }
}

fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

impl KvStore for FileKvStore {
    fn save(&self, kind: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(kind);
        fs::write(&path, bytes).map_err(|source| StorageError::Io { data_dir: path_string(&path), source })
    }

    fn load(&self, kind: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(kind);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { data_dir: path_string(&path), source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_of_an_absent_kind_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        assert_eq!(store.load("chain").unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        store.save("peers", b"some-bytes").unwrap();
        assert_eq!(store.load("peers").unwrap(), Some(b"some-bytes".to_vec()));
    }

    #[test]
    fn save_overwrites_the_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        store.save("keys", b"first").unwrap();
        store.save("keys", b"second").unwrap();
        assert_eq!(store.load("keys").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn new_creates_the_data_directory_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        FileKvStore::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
