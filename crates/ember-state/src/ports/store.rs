use crate::domain::errors::StateError;
use std::sync::Arc;

/// Ordered byte-to-byte persistent map.
///
/// The trie owns one of these and is its only writer; every mutation the
/// trie performs is a single `put`/`delete`, which the store must apply
/// atomically. Batches are a throughput convenience, not a transactional
/// guarantee the trie relies on.
pub trait KvStore: Send + Sync {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StateError>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    fn delete(&self, key: &[u8]) -> Result<(), StateError>;

    fn has(&self, key: &[u8]) -> Result<bool, StateError>;

    /// All entries in key order.
    fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError>;

    /// Entries with `start <= key < end`, in key order.
    fn iter_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError>;

    fn batch_put(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), StateError>;

    fn batch_delete(&self, keys: &[Vec<u8>]) -> Result<(), StateError>;

    /// Flush buffered writes. A no-op for purely in-memory stores.
    fn close(&self) -> Result<(), StateError> {
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        (**self).get(key)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        (**self).delete(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StateError> {
        (**self).has(key)
    }

    fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        (**self).iter_all()
    }

    fn iter_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        (**self).iter_range(start, end)
    }

    fn batch_put(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), StateError> {
        (**self).batch_put(entries)
    }

    fn batch_delete(&self, keys: &[Vec<u8>]) -> Result<(), StateError> {
        (**self).batch_delete(keys)
    }

    fn close(&self) -> Result<(), StateError> {
        (**self).close()
    }
}
