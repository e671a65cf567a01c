use crate::domain::errors::MempoolError;
use crate::ports::outbound::AccountReader;
use ember_state::{KvStore, StateDb};
use parking_lot::RwLock;
use shared_types::Address;
use std::sync::Arc;

/// [`AccountReader`] over a shared state database handle.
///
/// The pool only ever takes the read side of the lock; writes belong to
/// the execution engine.
pub struct TrieAccountReader<S: KvStore> {
    state: Arc<RwLock<StateDb<S>>>,
}

impl<S: KvStore> TrieAccountReader<S> {
    pub fn new(state: Arc<RwLock<StateDb<S>>>) -> Self {
        Self { state }
    }
}

impl<S: KvStore> AccountReader for TrieAccountReader<S> {
    fn account_nonce(&self, address: &Address) -> Result<u64, MempoolError> {
        Ok(self.state.read().account_nonce(address)?)
    }
}
