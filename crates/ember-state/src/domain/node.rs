use super::errors::StateError;
use super::nibbles::Nibbles;
use shared_crypto::keccak256;
use shared_types::{rlp, Hash, HASH_LENGTH};

// =============================================================================
// TRIE NODE: The three node shapes and their byte codec
// =============================================================================

/// Root hash of the empty trie.
pub const EMPTY_ROOT: Hash = [0u8; 32];

/// Node types in the Merkle Patricia Trie.
///
/// - Leaf: remaining path + value
/// - Extension: shared prefix + single child reference
/// - Branch: 16 child references + optional value
///
/// Children are referenced by hash, never inlined, so a node's byte form is
/// bounded regardless of subtree size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    /// Terminal node: stores the key suffix not consumed by ancestors and
    /// the opaque payload.
    Leaf { path: Nibbles, value: Vec<u8> },

    /// Path compression: a non-empty shared prefix and the hash of the
    /// single child below it.
    Extension { path: Nibbles, child: Hash },

    /// 16-way fan-out indexed by the next nibble, plus a value slot for a
    /// key terminating exactly at this branch.
    Branch {
        children: Box<[Option<Hash>; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    /// Encode this node to its canonical byte form.
    ///
    /// - Leaf: `[hex_prefix(path, leaf), value]`
    /// - Extension: `[hex_prefix(path, ext), child_hash]`
    /// - Branch: 17 items, each child as its hash or the empty string,
    ///   then the value or the empty string
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TrieNode::Leaf { path, value } => {
                rlp::encode_two_items(&path.encode_hex_prefix(true), value)
            }

            TrieNode::Extension { path, child } => {
                rlp::encode_two_items(&path.encode_hex_prefix(false), child)
            }

            TrieNode::Branch { children, value } => {
                let mut items: Vec<Vec<u8>> = Vec::with_capacity(17);
                for child in children.iter() {
                    match child {
                        Some(hash) => items.push(hash.to_vec()),
                        None => items.push(Vec::new()),
                    }
                }
                match value {
                    Some(v) => items.push(v.clone()),
                    None => items.push(Vec::new()),
                }
                rlp::encode_list_items(&items)
            }
        }
    }

    /// Decode a node from its byte form.
    ///
    /// # Errors
    /// `MalformedNode` on anything that is not a well-formed two- or
    /// seventeen-item node list.
    pub fn decode(bytes: &[u8]) -> Result<Self, StateError> {
        let items = rlp::decode_list(bytes)?;

        match items.len() {
            2 => {
                let (path, is_leaf) = Nibbles::decode_hex_prefix(&items[0])
                    .ok_or_else(|| StateError::MalformedNode("invalid hex-prefix path".into()))?;
                if is_leaf {
                    Ok(TrieNode::Leaf {
                        path,
                        value: items[1].clone(),
                    })
                } else {
                    if path.is_empty() {
                        return Err(StateError::MalformedNode(
                            "extension with empty path".into(),
                        ));
                    }
                    Ok(TrieNode::Extension {
                        path,
                        child: decode_child_hash(&items[1])?.ok_or_else(|| {
                            StateError::MalformedNode("extension without child".into())
                        })?,
                    })
                }
            }

            17 => {
                let mut children: [Option<Hash>; 16] = [None; 16];
                for (slot, item) in children.iter_mut().zip(&items[..16]) {
                    *slot = decode_child_hash(item)?;
                }
                let value = if items[16].is_empty() {
                    None
                } else {
                    Some(items[16].clone())
                };
                Ok(TrieNode::Branch {
                    children: Box::new(children),
                    value,
                })
            }

            n => Err(StateError::MalformedNode(format!(
                "expected 2 or 17 items, found {n}"
            ))),
        }
    }

    /// Hash of the encoded node; the node's identity in the store.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }
}

fn decode_child_hash(item: &[u8]) -> Result<Option<Hash>, StateError> {
    match item.len() {
        0 => Ok(None),
        HASH_LENGTH => {
            let mut hash = [0u8; HASH_LENGTH];
            hash.copy_from_slice(item);
            Ok(Some(hash))
        }
        n => Err(StateError::MalformedNode(format!(
            "child reference of {n} bytes"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch_with(children: Vec<(usize, Hash)>, value: Option<Vec<u8>>) -> TrieNode {
        let mut slots: [Option<Hash>; 16] = [None; 16];
        for (index, hash) in children {
            slots[index] = Some(hash);
        }
        TrieNode::Branch {
            children: Box::new(slots),
            value,
        }
    }

    #[test]
    fn test_leaf_roundtrip() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![1, 2, 3]),
            value: vec![0xAB, 0xCD],
        };
        let decoded = TrieNode::decode(&leaf.encode()).unwrap();
        assert_eq!(decoded, leaf);
    }

    #[test]
    fn test_empty_path_leaf_roundtrip() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![]),
            value: b"payload".to_vec(),
        };
        assert_eq!(TrieNode::decode(&leaf.encode()).unwrap(), leaf);
    }

    #[test]
    fn test_extension_roundtrip() {
        let ext = TrieNode::Extension {
            path: Nibbles(vec![0, 15]),
            child: [0x37; 32],
        };
        assert_eq!(TrieNode::decode(&ext.encode()).unwrap(), ext);
    }

    #[test]
    fn test_branch_roundtrip() {
        let branch = branch_with(
            vec![(0, [0x11; 32]), (7, [0x22; 32]), (15, [0x33; 32])],
            Some(b"at-branch".to_vec()),
        );
        assert_eq!(TrieNode::decode(&branch.encode()).unwrap(), branch);
    }

    #[test]
    fn test_branch_without_value_roundtrip() {
        let branch = branch_with(vec![(3, [0x44; 32]), (9, [0x55; 32])], None);
        assert_eq!(TrieNode::decode(&branch.encode()).unwrap(), branch);
    }

    #[test]
    fn test_equal_nodes_equal_hashes() {
        let a = TrieNode::Leaf {
            path: Nibbles(vec![1, 2, 3, 4]),
            value: vec![0xAB],
        };
        let b = a.clone();
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), EMPTY_ROOT);
    }

    #[test]
    fn test_different_nodes_different_hashes() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![1]),
            value: vec![1],
        };
        let other = TrieNode::Leaf {
            path: Nibbles(vec![1]),
            value: vec![2],
        };
        assert_ne!(leaf.hash(), other.hash());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TrieNode::decode(&[]).is_err());
        assert!(TrieNode::decode(b"not rlp at all").is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let bytes = rlp::encode_list_items(&vec![Vec::new(); 5]);
        assert!(matches!(
            TrieNode::decode(&bytes),
            Err(StateError::MalformedNode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_short_child_hash() {
        let mut items = vec![Vec::new(); 17];
        items[4] = vec![0xAA; 16];
        let bytes = rlp::encode_list_items(&items);
        assert!(matches!(
            TrieNode::decode(&bytes),
            Err(StateError::MalformedNode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_extension_path() {
        let bytes = rlp::encode_two_items(
            &Nibbles(vec![]).encode_hex_prefix(false),
            &[0x01; 32],
        );
        assert!(matches!(
            TrieNode::decode(&bytes),
            Err(StateError::MalformedNode(_))
        ));
    }

    #[test]
    fn test_leaf_and_extension_encodings_differ() {
        let path = Nibbles(vec![1, 2]);
        let leaf = TrieNode::Leaf {
            path: path.clone(),
            value: vec![0xAA; 32],
        };
        let ext = TrieNode::Extension {
            path,
            child: [0xAA; 32],
        };
        assert_ne!(leaf.encode(), ext.encode());
    }
}
