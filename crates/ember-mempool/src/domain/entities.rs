//! Core domain entities for the transaction pool: the admitted-transaction
//! wrapper, the per-sender box, and the pool configuration.

use super::errors::MempoolError;
use shared_types::{Address, Hash, SignedTransaction, U256};
use std::collections::VecDeque;

/// A transaction admitted to the pool, with its identity fields cached so
/// ordering and lookups never re-run recovery or hashing.
#[derive(Clone, Debug)]
pub struct PoolTransaction {
    /// The signed transaction itself.
    pub transaction: SignedTransaction,
    /// Identity hash (covers the signature).
    pub hash: Hash,
    /// Recovered sender address.
    pub sender: Address,
    /// Sender's nonce for this transaction.
    pub nonce: u64,
    /// Gas price used for prioritization.
    pub gas_price: U256,
}

impl PoolTransaction {
    /// Wrap a signed transaction, recovering its sender.
    ///
    /// # Errors
    /// `SignatureInvalid` if sender recovery fails.
    pub fn new(transaction: SignedTransaction) -> Result<Self, MempoolError> {
        let sender = transaction
            .recover_sender()
            .map_err(|e| MempoolError::SignatureInvalid(e.to_string()))?;
        Ok(Self {
            hash: transaction.hash(),
            sender,
            nonce: transaction.nonce,
            gas_price: transaction.gas_price,
            transaction,
        })
    }
}

/// A run of one sender's transactions with strictly consecutive nonces.
///
/// The box is a queue: transactions enter at the tail (next nonce, price at
/// or above the box price) and leave at the head. Its `gas_price` is the
/// first transaction's price and is the key the global extraction order
/// sees; later transactions may be priced higher but never below it.
#[derive(Clone, Debug)]
pub struct TxBox {
    transactions: VecDeque<PoolTransaction>,
    first_nonce: u64,
    last_nonce: u64,
    gas_price: U256,
    sender: Address,
}

impl TxBox {
    /// A box holding a single transaction.
    pub fn new(tx: PoolTransaction) -> Self {
        Self {
            first_nonce: tx.nonce,
            last_nonce: tx.nonce,
            gas_price: tx.gas_price,
            sender: tx.sender,
            transactions: VecDeque::from([tx]),
        }
    }

    /// True if `tx` may join the tail of this box: same sender, the next
    /// consecutive nonce, and a price at or above the box price.
    pub fn can_append(&self, tx: &PoolTransaction) -> bool {
        tx.sender == self.sender
            && tx.nonce == self.last_nonce + 1
            && tx.gas_price >= self.gas_price
    }

    /// Enqueue at the tail. Caller must have checked [`can_append`].
    ///
    /// [`can_append`]: TxBox::can_append
    pub fn append(&mut self, tx: PoolTransaction) {
        debug_assert!(self.can_append(&tx));
        self.last_nonce = tx.nonce;
        self.transactions.push_back(tx);
    }

    /// Dequeue from the head.
    pub fn pop_front(&mut self) -> Option<PoolTransaction> {
        let tx = self.transactions.pop_front()?;
        if let Some(next) = self.transactions.front() {
            self.first_nonce = next.nonce;
        }
        Some(tx)
    }

    /// Price of the transaction at `nonce`, if it sits in this box.
    pub fn price_of(&self, nonce: u64) -> Option<U256> {
        self.transactions
            .iter()
            .find(|tx| tx.nonce == nonce)
            .map(|tx| tx.gas_price)
    }

    pub fn into_transactions(self) -> VecDeque<PoolTransaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn first_nonce(&self) -> u64 {
        self.first_nonce
    }

    pub fn last_nonce(&self) -> u64 {
        self.last_nonce
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn sender(&self) -> Address {
        self.sender
    }
}

/// Pool configuration.
#[derive(Clone, Debug, Default)]
pub struct PoolConfig {
    /// Minimum percentage a replacement must raise the gas price by.
    /// Zero (the default) makes replacement unconditional.
    pub price_bump_percent: u64,
}

impl PoolConfig {
    /// Config with the replace-by-fee price bump enabled.
    pub fn with_price_bump(percent: u64) -> Self {
        Self {
            price_bump_percent: percent,
        }
    }
}
