//! # Merkle Patricia Trie
//!
//! A hash-addressed radix trie over nibble paths, persisted through the
//! [`KvStore`] port. Updates are path-copy rewrites: every touched node is
//! re-encoded, re-hashed and written under its new hash, children before
//! parents, and the root hash replaced last. A root hash observed in the
//! store therefore only ever references nodes that are already persisted.
//!
//! Lookups walk from the root, loading nodes lazily; a missing key is a
//! regular `None`, never an error. Only corruption (undecodable node
//! bytes, a dangling child reference) surfaces as an error.

use super::cache::NodeCache;
use super::errors::StateError;
use super::nibbles::Nibbles;
use super::node::{TrieNode, EMPTY_ROOT};
use crate::ports::store::KvStore;
use shared_types::{Hash, HASH_LENGTH};

/// Store key holding the current root hash. Node keys are raw 32-byte
/// hashes, so this shorter key can never collide with one.
const ROOT_KEY: &[u8] = b"trie:root";

/// Outcome of a recursive removal below some node.
enum Removal {
    /// The key was not present; the node is handed back untouched.
    NotFound(TrieNode),
    /// The key was removed and the node rewritten (or collapsed away).
    Removed(Option<TrieNode>),
}

/// A Merkle Patricia Trie over an ordered key/value store.
pub struct MerkleTrie<S: KvStore> {
    store: S,
    root: Option<Hash>,
    cache: NodeCache,
}

impl<S: KvStore> MerkleTrie<S> {
    /// Open a trie over `store`, resuming from the persisted root pointer
    /// if one exists.
    pub fn new(store: S) -> Result<Self, StateError> {
        let root = match store.get(ROOT_KEY)? {
            None => None,
            Some(bytes) => {
                if bytes.len() != HASH_LENGTH {
                    return Err(StateError::CorruptRootPointer(bytes.len()));
                }
                let mut hash = [0u8; HASH_LENGTH];
                hash.copy_from_slice(&bytes);
                Some(hash)
            }
        };
        Ok(Self {
            store,
            root,
            cache: NodeCache::new(),
        })
    }

    /// Current root hash; [`EMPTY_ROOT`] for the empty trie.
    pub fn root_hash(&self) -> Hash {
        self.root.unwrap_or(EMPTY_ROOT)
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert or update a key.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        let nibbles = Nibbles::from_bytes(key);

        let new_root = match self.root {
            None => TrieNode::Leaf {
                path: nibbles,
                value: value.to_vec(),
            },
            Some(hash) => {
                let root = self.load_node(&hash)?;
                self.insert_at(root, &nibbles.0, value.to_vec())?
            }
        };

        let root_hash = self.persist_node(&new_root)?;
        self.set_root(Some(root_hash))?;
        tracing::trace!(root = %hex::encode(root_hash), key_len = key.len(), "trie updated");
        Ok(())
    }

    /// Look up a key. A missing key is `Ok(None)`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        let Some(hash) = self.root else {
            return Ok(None);
        };
        let root = self.load_node(&hash)?;
        let nibbles = Nibbles::from_bytes(key);
        self.lookup_at(&root, &nibbles.0)
    }

    /// True if the key is present.
    pub fn has(&self, key: &[u8]) -> Result<bool, StateError> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove a key. Returns `false` if it was not present.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool, StateError> {
        let Some(hash) = self.root else {
            return Ok(false);
        };
        let root = self.load_node(&hash)?;
        let nibbles = Nibbles::from_bytes(key);

        match self.remove_at(root, &nibbles.0)? {
            Removal::NotFound(_) => Ok(false),
            Removal::Removed(None) => {
                self.set_root(None)?;
                Ok(true)
            }
            Removal::Removed(Some(new_root)) => {
                let root_hash = self.persist_node(&new_root)?;
                self.set_root(Some(root_hash))?;
                Ok(true)
            }
        }
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    /// Insert below `node`, consuming the remaining nibbles in `path`.
    ///
    /// Returns the rewritten node, not yet persisted; any node it
    /// references by hash has already been written.
    fn insert_at(
        &mut self,
        node: TrieNode,
        path: &[u8],
        value: Vec<u8>,
    ) -> Result<TrieNode, StateError> {
        match node {
            TrieNode::Leaf {
                path: leaf_path,
                value: leaf_value,
            } => {
                if leaf_path.0 == path {
                    return Ok(TrieNode::Leaf {
                        path: leaf_path,
                        value,
                    });
                }
                let split = common_prefix_len(&leaf_path.0, path);

                let mut children: [Option<Hash>; 16] = [None; 16];
                let mut branch_value = None;

                if leaf_path.len() > split {
                    let index = leaf_path.at(split) as usize;
                    let child = TrieNode::Leaf {
                        path: leaf_path.slice(split + 1),
                        value: leaf_value,
                    };
                    children[index] = Some(self.persist_node(&child)?);
                } else {
                    branch_value = Some(leaf_value);
                }

                if path.len() > split {
                    let index = path[split] as usize;
                    let child = TrieNode::Leaf {
                        path: Nibbles(path[split + 1..].to_vec()),
                        value,
                    };
                    children[index] = Some(self.persist_node(&child)?);
                } else {
                    branch_value = Some(value);
                }

                self.wrap_in_prefix(
                    &path[..split],
                    TrieNode::Branch {
                        children: Box::new(children),
                        value: branch_value,
                    },
                )
            }

            TrieNode::Extension {
                path: ext_path,
                child,
            } => {
                let split = common_prefix_len(&ext_path.0, path);

                if split == ext_path.len() {
                    // The extension is fully on the way to the key.
                    let loaded = self.load_node(&child)?;
                    let new_child = self.insert_at(loaded, &path[split..], value)?;
                    return Ok(TrieNode::Extension {
                        path: ext_path,
                        child: self.persist_node(&new_child)?,
                    });
                }

                // Diverges inside the extension path: split into a branch
                // holding the shortened extension on one side and a fresh
                // leaf (or the branch value) on the other.
                let mut children: [Option<Hash>; 16] = [None; 16];
                let mut branch_value = None;

                let index = ext_path.at(split) as usize;
                let remainder = ext_path.slice(split + 1);
                children[index] = if remainder.is_empty() {
                    // A zero-length extension is elided: point straight at
                    // the child.
                    Some(child)
                } else {
                    Some(self.persist_node(&TrieNode::Extension {
                        path: remainder,
                        child,
                    })?)
                };

                if path.len() > split {
                    let leaf_index = path[split] as usize;
                    let leaf = TrieNode::Leaf {
                        path: Nibbles(path[split + 1..].to_vec()),
                        value,
                    };
                    children[leaf_index] = Some(self.persist_node(&leaf)?);
                } else {
                    branch_value = Some(value);
                }

                self.wrap_in_prefix(
                    &path[..split],
                    TrieNode::Branch {
                        children: Box::new(children),
                        value: branch_value,
                    },
                )
            }

            TrieNode::Branch {
                mut children,
                value: branch_value,
            } => {
                if path.is_empty() {
                    return Ok(TrieNode::Branch {
                        children,
                        value: Some(value),
                    });
                }

                let index = path[0] as usize;
                let new_child = match children[index] {
                    None => TrieNode::Leaf {
                        path: Nibbles(path[1..].to_vec()),
                        value,
                    },
                    Some(hash) => {
                        let loaded = self.load_node(&hash)?;
                        self.insert_at(loaded, &path[1..], value)?
                    }
                };
                children[index] = Some(self.persist_node(&new_child)?);

                Ok(TrieNode::Branch {
                    children,
                    value: branch_value,
                })
            }
        }
    }

    /// Wrap `node` in an extension carrying `prefix`, eliding the wrapper
    /// when the prefix is empty.
    fn wrap_in_prefix(&mut self, prefix: &[u8], node: TrieNode) -> Result<TrieNode, StateError> {
        if prefix.is_empty() {
            return Ok(node);
        }
        Ok(TrieNode::Extension {
            path: Nibbles(prefix.to_vec()),
            child: self.persist_node(&node)?,
        })
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    fn lookup_at(&self, node: &TrieNode, path: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match node {
            TrieNode::Leaf {
                path: leaf_path,
                value,
            } => {
                if leaf_path.0 == path {
                    Ok(Some(value.clone()))
                } else {
                    Ok(None)
                }
            }

            TrieNode::Extension {
                path: ext_path,
                child,
            } => {
                if !path.starts_with(&ext_path.0) {
                    return Ok(None);
                }
                let loaded = self.load_node(child)?;
                self.lookup_at(&loaded, &path[ext_path.len()..])
            }

            TrieNode::Branch { children, value } => {
                if path.is_empty() {
                    return Ok(value.clone());
                }
                match children[path[0] as usize] {
                    None => Ok(None),
                    Some(hash) => {
                        let loaded = self.load_node(&hash)?;
                        self.lookup_at(&loaded, &path[1..])
                    }
                }
            }
        }
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    fn remove_at(&mut self, node: TrieNode, path: &[u8]) -> Result<Removal, StateError> {
        match node {
            TrieNode::Leaf {
                path: leaf_path,
                value,
            } => {
                if leaf_path.0 == path {
                    Ok(Removal::Removed(None))
                } else {
                    Ok(Removal::NotFound(TrieNode::Leaf {
                        path: leaf_path,
                        value,
                    }))
                }
            }

            TrieNode::Extension {
                path: ext_path,
                child,
            } => {
                if !path.starts_with(&ext_path.0) {
                    return Ok(Removal::NotFound(TrieNode::Extension {
                        path: ext_path,
                        child,
                    }));
                }
                let loaded = self.load_node(&child)?;
                match self.remove_at(loaded, &path[ext_path.len()..])? {
                    Removal::NotFound(_) => Ok(Removal::NotFound(TrieNode::Extension {
                        path: ext_path,
                        child,
                    })),
                    Removal::Removed(None) => Ok(Removal::Removed(None)),
                    Removal::Removed(Some(new_child)) => {
                        Ok(Removal::Removed(Some(self.merge_extension(
                            ext_path, new_child,
                        )?)))
                    }
                }
            }

            TrieNode::Branch {
                mut children,
                value,
            } => {
                if path.is_empty() {
                    if value.is_none() {
                        return Ok(Removal::NotFound(TrieNode::Branch { children, value }));
                    }
                    return Ok(Removal::Removed(self.collapse_branch(children, None)?));
                }

                let index = path[0] as usize;
                let Some(hash) = children[index] else {
                    return Ok(Removal::NotFound(TrieNode::Branch { children, value }));
                };

                let loaded = self.load_node(&hash)?;
                match self.remove_at(loaded, &path[1..])? {
                    Removal::NotFound(_) => {
                        Ok(Removal::NotFound(TrieNode::Branch { children, value }))
                    }
                    Removal::Removed(Some(new_child)) => {
                        children[index] = Some(self.persist_node(&new_child)?);
                        Ok(Removal::Removed(Some(TrieNode::Branch {
                            children,
                            value,
                        })))
                    }
                    Removal::Removed(None) => {
                        children[index] = None;
                        Ok(Removal::Removed(self.collapse_branch(children, value)?))
                    }
                }
            }
        }
    }

    /// Re-establish the branch invariant after a slot or the value was
    /// cleared: a branch keeps at least two occupied slots (counting the
    /// value), otherwise it collapses into something smaller.
    fn collapse_branch(
        &mut self,
        children: Box<[Option<Hash>; 16]>,
        value: Option<Vec<u8>>,
    ) -> Result<Option<TrieNode>, StateError> {
        let occupied: Vec<usize> = (0..16).filter(|&i| children[i].is_some()).collect();

        match (occupied.len(), value) {
            (0, None) => Ok(None),

            // Only the value left: the branch degenerates to a leaf that
            // terminates right here.
            (0, Some(v)) => Ok(Some(TrieNode::Leaf {
                path: Nibbles(Vec::new()),
                value: v,
            })),

            // A single child and no value: the branch vanishes and the
            // child absorbs the branch nibble.
            (1, None) => {
                let index = occupied[0];
                let Some(child_hash) = children[index] else {
                    return Err(StateError::MalformedNode("branch slot vanished".into()));
                };
                let child = self.load_node(&child_hash)?;
                let nibble = Nibbles::single(index as u8);
                match child {
                    TrieNode::Leaf { path, value } => Ok(Some(TrieNode::Leaf {
                        path: nibble.join(&path),
                        value,
                    })),
                    TrieNode::Extension { path, child } => Ok(Some(TrieNode::Extension {
                        path: nibble.join(&path),
                        child,
                    })),
                    TrieNode::Branch { .. } => Ok(Some(TrieNode::Extension {
                        path: nibble,
                        child: child_hash,
                    })),
                }
            }

            (_, value) => Ok(Some(TrieNode::Branch { children, value })),
        }
    }

    /// Fold a rewritten child back under an extension, merging paths so no
    /// extension ever points at a leaf or another extension.
    fn merge_extension(
        &mut self,
        ext_path: Nibbles,
        child: TrieNode,
    ) -> Result<TrieNode, StateError> {
        match child {
            TrieNode::Leaf { path, value } => Ok(TrieNode::Leaf {
                path: ext_path.join(&path),
                value,
            }),
            TrieNode::Extension { path, child } => Ok(TrieNode::Extension {
                path: ext_path.join(&path),
                child,
            }),
            branch @ TrieNode::Branch { .. } => {
                let child_hash = self.persist_node(&branch)?;
                Ok(TrieNode::Extension {
                    path: ext_path,
                    child: child_hash,
                })
            }
        }
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Load a node, preferring the decoded-node cache. Entries are keyed
    /// by content hash, so a cache hit is always current.
    fn load_node(&self, hash: &Hash) -> Result<TrieNode, StateError> {
        if let Some(node) = self.cache.get(hash) {
            return Ok(node);
        }
        let bytes = self
            .store
            .get(hash)?
            .ok_or(StateError::MissingNode { hash: *hash })?;
        let node = TrieNode::decode(&bytes)?;
        self.cache.put(*hash, node.clone());
        Ok(node)
    }

    /// Write a node under the hash of its encoding. Identical nodes write
    /// identical entries, so replays are idempotent.
    fn persist_node(&mut self, node: &TrieNode) -> Result<Hash, StateError> {
        let bytes = node.encode();
        let hash = shared_crypto::keccak256(&bytes);
        self.store.put(&hash, &bytes)?;
        self.cache.put(hash, node.clone());
        Ok(hash)
    }

    fn set_root(&mut self, root: Option<Hash>) -> Result<(), StateError> {
        match root {
            Some(hash) => self.store.put(ROOT_KEY, &hash)?,
            None => self.store.delete(ROOT_KEY)?,
        }
        self.root = root;
        Ok(())
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
