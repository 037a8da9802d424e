//! Key-value blob persistence and the holdings store built on it.

mod holdings;

pub use holdings::{EmptyHoldings, Holdings, HoldingsStore, parse_quantity};

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Synchronous key-value store of opaque byte blobs.
pub trait BlobStore: Send {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Blob store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::storage(format!("invalid blob key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| Error::storage(e.to_string()))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

impl<T: BlobStore + Sync> BlobStore for std::sync::Arc<T> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).save(key, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cryptoton-blobs-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_missing_key() {
        let store = FileBlobStore::new(temp_dir());
        assert_eq!(store.load("crypto_holdings").unwrap(), None);
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = temp_dir();
        let store = FileBlobStore::new(&dir);
        store.save("crypto_holdings", b"{\"bitcoin\":2.0}").unwrap();
        store.save("crypto_holdings", b"{\"bitcoin\":3.0}").unwrap();

        let bytes = store.load("crypto_holdings").unwrap().unwrap();
        assert_eq!(bytes, b"{\"bitcoin\":3.0}");
        assert!(!dir.join("crypto_holdings.json.tmp").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let store = FileBlobStore::new(temp_dir());
        assert!(store.save("../escape", b"x").is_err());
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.save("k", b"v").unwrap();
        assert_eq!(store.load("k").unwrap(), Some(b"v".to_vec()));
    }
}
