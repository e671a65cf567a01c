//! # Account State Database
//!
//! Account records layered over the trie: key = address bytes, value = the
//! account's deterministic byte encoding. A missing account reads as the
//! all-zero record, so accounts spring into existence on first write.

use super::errors::StateError;
use super::trie::MerkleTrie;
use crate::ports::state::AccountStore;
use crate::ports::store::KvStore;
use shared_types::{Account, Address, Hash};

pub struct StateDb<S: KvStore> {
    trie: MerkleTrie<S>,
}

impl<S: KvStore> StateDb<S> {
    /// Open the account database over `store`.
    pub fn new(store: S) -> Result<Self, StateError> {
        Ok(Self {
            trie: MerkleTrie::new(store)?,
        })
    }

    /// Current state root.
    pub fn root_hash(&self) -> Hash {
        self.trie.root_hash()
    }

    /// Read an account; missing accounts are the zero account.
    pub fn get_account(&self, address: &Address) -> Result<Account, StateError> {
        match self.trie.get(address)? {
            None => Ok(Account::default()),
            Some(bytes) => {
                Account::decode(&bytes).map_err(|e| StateError::MalformedAccount(e.to_string()))
            }
        }
    }

    /// Write an account record.
    pub fn put_account(&mut self, address: &Address, account: &Account) -> Result<(), StateError> {
        let bytes = account
            .encode()
            .map_err(|e| StateError::MalformedAccount(e.to_string()))?;
        self.trie.put(address, &bytes)
    }

    /// True if the account has ever been written.
    pub fn account_exists(&self, address: &Address) -> Result<bool, StateError> {
        self.trie.has(address)
    }

    /// The account's current transaction count.
    pub fn account_nonce(&self, address: &Address) -> Result<u64, StateError> {
        Ok(self.get_account(address)?.nonce)
    }

    /// Raw trie access for callers that store non-account records.
    pub fn trie(&self) -> &MerkleTrie<S> {
        &self.trie
    }

    pub fn trie_mut(&mut self) -> &mut MerkleTrie<S> {
        &mut self.trie
    }
}

impl<S: KvStore> AccountStore for StateDb<S> {
    fn get_account(&self, address: &Address) -> Result<Account, StateError> {
        StateDb::get_account(self, address)
    }

    fn put_account(&mut self, address: &Address, account: &Account) -> Result<(), StateError> {
        StateDb::put_account(self, address, account)
    }

    fn account_exists(&self, address: &Address) -> Result<bool, StateError> {
        StateDb::account_exists(self, address)
    }

    fn root_hash(&self) -> Hash {
        StateDb::root_hash(self)
    }
}
