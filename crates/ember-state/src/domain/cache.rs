//! # Decoded-Node Cache
//!
//! An LRU cache of decoded trie nodes in front of the store.
//!
//! Node entries are content-addressed: the key is the hash of the node's
//! encoding, so a cached node can never go stale. Cached nodes are
//! read-only snapshots; updates always build new nodes under new hashes.
//! The cache exists purely to bound repeated decode work on hot paths.

use super::node::TrieNode;
use lru::LruCache;
use parking_lot::Mutex;
use shared_types::Hash;
use std::num::NonZeroUsize;

/// Default number of decoded nodes kept in memory.
pub const DEFAULT_NODE_CACHE_CAPACITY: usize = 4096;

pub struct NodeCache {
    entries: Mutex<LruCache<Hash, TrieNode>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CACHE_CAPACITY)
    }

    /// Create with custom capacity (clamped to at least one entry).
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, hash: &Hash) -> Option<TrieNode> {
        self.entries.lock().get(hash).cloned()
    }

    pub fn put(&self, hash: Hash, node: TrieNode) {
        self.entries.lock().put(hash, node);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}
