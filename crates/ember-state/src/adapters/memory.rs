use crate::domain::errors::StateError;
use crate::ports::store::KvStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory implementation of [`KvStore`].
///
/// Backed by an ordered map so range scans behave exactly like the on-disk
/// store. The default choice for tests and single-process tooling.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StateError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn iter_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self
            .entries
            .read()
            .range(start.to_vec()..end.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn batch_put(&self, batch: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), StateError> {
        let mut entries = self.entries.write();
        for (key, value) in batch {
            entries.insert(key, value);
        }
        Ok(())
    }

    fn batch_delete(&self, keys: &[Vec<u8>]) -> Result<(), StateError> {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
