use crate::domain::errors::StateError;
use crate::ports::store::KvStore;
use std::path::Path;

/// Embedded on-disk implementation of [`KvStore`] backed by `sled`.
///
/// Durable across restarts; each operation is crash-safe on its own.
/// `sled` keeps keys ordered, so range scans come straight from the tree.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let db = sled::open(path.as_ref()).map_err(|e| StateError::Store(e.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), "opened sled store");
        Ok(Self { db })
    }
}

impl KvStore for SledStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.db
            .insert(key, value)
            .map(|_| ())
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.db
            .get(key)
            .map(|value| value.map(|v| v.to_vec()))
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        self.db
            .remove(key)
            .map(|_| ())
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn has(&self, key: &[u8]) -> Result<bool, StateError> {
        self.db
            .contains_key(key)
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (key, value) = item.map_err(|e| StateError::Store(e.to_string()))?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    fn iter_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        if start >= end {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for item in self.db.range(start..end) {
            let (key, value) = item.map_err(|e| StateError::Store(e.to_string()))?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    fn batch_put(&self, batch: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), StateError> {
        let mut writes = sled::Batch::default();
        for (key, value) in batch {
            writes.insert(key, value);
        }
        self.db
            .apply_batch(writes)
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn batch_delete(&self, keys: &[Vec<u8>]) -> Result<(), StateError> {
        let mut writes = sled::Batch::default();
        for key in keys {
            writes.remove(key.as_slice());
        }
        self.db
            .apply_batch(writes)
            .map_err(|e| StateError::Store(e.to_string()))
    }

    fn close(&self) -> Result<(), StateError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| StateError::Store(e.to_string()))
    }
}
