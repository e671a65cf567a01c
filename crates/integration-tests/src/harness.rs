//! In-memory wiring of the full stack: one store, one state database,
//! one engine, one pool reading nonces from the live trie.

use ember_mempool::{TrieAccountReader, TxPool};
use ember_state::{MemoryStore, StateDb};
use ember_vm::Vm;
use parking_lot::RwLock;
use shared_types::{address_from_secret, Address, SignedTransaction, U256};
use std::sync::Arc;

pub struct TestChain {
    pub state: Arc<RwLock<StateDb<MemoryStore>>>,
    pub vm: Vm<MemoryStore>,
    pub pool: TxPool<TrieAccountReader<MemoryStore>>,
}

impl TestChain {
    pub fn new() -> Self {
        let state = Arc::new(RwLock::new(
            StateDb::new(MemoryStore::new()).expect("in-memory state"),
        ));
        let vm = Vm::new(state.clone());
        let pool = TxPool::new(TrieAccountReader::new(state.clone()));
        Self { state, vm, pool }
    }

    /// Extract and execute until the pool runs dry; returns how many
    /// transactions were applied.
    pub fn run_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Some(tx) = self.pool.extract_one() {
            self.vm
                .execute(&tx.transaction)
                .expect("extracted transaction should execute");
            applied += 1;
        }
        applied
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

/// A deterministic secret key, distinct per `key`.
pub fn secret(key: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = key;
    bytes
}

/// The address controlled by `secret(key)`.
pub fn account_of(key: u8) -> Address {
    address_from_secret(&secret(key)).expect("test secret is a valid key")
}

/// A signed transfer from `secret(key)`.
pub fn signed_transfer(
    key: u8,
    nonce: u64,
    to: Address,
    value: u64,
    gas_limit: u64,
    gas_price: u64,
) -> SignedTransaction {
    let mut tx = SignedTransaction::new(
        nonce,
        Some(to),
        U256::from(value),
        gas_limit,
        U256::from(gas_price),
        Vec::new(),
        U256::from(1u64),
    );
    tx.sign(&secret(key)).expect("test secret signs");
    tx
}
