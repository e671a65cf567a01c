//! # Transaction Pool
//!
//! The two-level, fee-ordered pool.
//!
//! ## Data Structures
//!
//! - `pending`: per sender, a chain of [`TxBox`]es starting at the
//!   executable frontier (`account.nonce + 1`), consecutive across boxes
//! - `queue`: per sender, nonce-indexed parking for transactions above a
//!   nonce gap
//! - `by_price`: the extraction order, one entry per sender with pending
//!   work, ordered by head-box gas price (descending) then address
//!
//! ## Invariants Enforced
//!
//! - A sender's first pending box starts at `account.nonce + 1`
//! - Adjacent pending boxes have consecutive nonces
//!   (`box[i+1].first_nonce == box[i].last_nonce + 1`)
//! - A transaction joins the tail box only at or above its price; a
//!   cheaper successor starts its own box so the global sort sees it at
//!   its own price
//! - `by_price` holds exactly the head box of every pending sender

use super::entities::{PoolConfig, PoolTransaction, TxBox};
use super::errors::MempoolError;
use super::value_objects::{PoolStatus, PricedBox};
use crate::ports::outbound::AccountReader;
use shared_types::{Address, SignedTransaction, U256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// The transaction pool. `N` supplies current account nonces (read-only
/// trie access); the pool itself is a pure in-memory structure.
pub struct TxPool<N: AccountReader> {
    state: N,
    config: PoolConfig,
    pending: HashMap<Address, Vec<TxBox>>,
    queue: HashMap<Address, BTreeMap<u64, PoolTransaction>>,
    by_price: BTreeSet<PricedBox>,
}

impl<N: AccountReader> TxPool<N> {
    /// Create a pool with default configuration (unconditional
    /// replacement).
    pub fn new(state: N) -> Self {
        Self::with_config(state, PoolConfig::default())
    }

    pub fn with_config(state: N, config: PoolConfig) -> Self {
        Self {
            state,
            config,
            pending: HashMap::new(),
            queue: HashMap::new(),
            by_price: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Executable transactions across all senders.
    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .flat_map(|boxes| boxes.iter())
            .map(TxBox::len)
            .sum()
    }

    /// Parked transactions waiting on a nonce gap.
    pub fn queued_count(&self) -> usize {
        self.queue.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.queue.is_empty()
    }

    pub fn status(&self) -> PoolStatus {
        let senders: HashSet<&Address> = self.pending.keys().chain(self.queue.keys()).collect();
        PoolStatus {
            pending_count: self.pending_count(),
            queued_count: self.queued_count(),
            sender_count: senders.len(),
        }
    }

    /// Admit a signed transaction.
    ///
    /// Placement is decided against the sender's executable frontier:
    /// at the frontier the transaction joins `pending` (and may pull
    /// successors out of the queue); above it the transaction is parked;
    /// at an already-pending nonce it replaces the existing transaction.
    ///
    /// # Errors
    /// - `SignatureInvalid` if sender recovery fails
    /// - `NonceTooLow` if the nonce is at or below the account nonce
    /// - `ReplaceUnderpriced` if a configured price bump is not met
    pub fn submit(&mut self, transaction: SignedTransaction) -> Result<(), MempoolError> {
        let tx = PoolTransaction::new(transaction)?;
        let sender = tx.sender;

        let account_nonce = self.state.account_nonce(&sender)?;
        if tx.nonce <= account_nonce {
            return Err(MempoolError::NonceTooLow {
                nonce: tx.nonce,
                current: account_nonce,
            });
        }

        let frontier = self
            .pending
            .get(&sender)
            .and_then(|boxes| boxes.last())
            .map(|last| last.last_nonce())
            .unwrap_or(account_nonce);

        if tx.nonce > frontier + 1 {
            tracing::debug!(
                sender = %hex::encode(sender),
                nonce = tx.nonce,
                expected = frontier + 1,
                "nonce gap, transaction parked in queue"
            );
            self.queue.entry(sender).or_default().insert(tx.nonce, tx);
            return Ok(());
        }

        if tx.nonce == frontier + 1 {
            self.deindex_head(&sender);
            let boxes = self.pending.entry(sender).or_default();
            Self::push_tail(boxes, tx);
            self.promote_queued(&sender);
            self.index_head(&sender);
            tracing::debug!(sender = %hex::encode(sender), "transaction pending");
            return Ok(());
        }

        self.replace_pending(tx)
    }

    /// Take the next executable transaction: the head of the highest
    /// priced head box, ties broken by ascending sender address. `None`
    /// when nothing is pending.
    pub fn extract_one(&mut self) -> Option<PoolTransaction> {
        let best = self.by_price.iter().next().cloned()?;
        let sender = best.sender;

        self.deindex_head(&sender);
        let boxes = self.pending.get_mut(&sender)?;
        let tx = boxes.first_mut()?.pop_front()?;

        if boxes.first().is_some_and(TxBox::is_empty) {
            boxes.remove(0);
        }
        if boxes.is_empty() {
            self.pending.remove(&sender);
        }
        self.index_head(&sender);

        tracing::debug!(
            sender = %hex::encode(sender),
            nonce = tx.nonce,
            gas_price = %tx.gas_price,
            "transaction extracted"
        );
        Some(tx)
    }

    // =========================================================================
    // PLACEMENT
    // =========================================================================

    /// Append to the tail of a sender's pending chain: joins the last box
    /// when the price allows, otherwise starts a new box.
    fn push_tail(boxes: &mut Vec<TxBox>, tx: PoolTransaction) {
        match boxes.last_mut() {
            Some(last) if last.can_append(&tx) => last.append(tx),
            _ => boxes.push(TxBox::new(tx)),
        }
    }

    /// Pull contiguous successors out of the queue after the frontier
    /// advanced.
    fn promote_queued(&mut self, sender: &Address) {
        let Some(queued) = self.queue.get_mut(sender) else {
            return;
        };
        let Some(boxes) = self.pending.get_mut(sender) else {
            return;
        };
        let Some(last) = boxes.last() else {
            return;
        };

        let mut next = last.last_nonce() + 1;
        let mut promoted = 0usize;
        while let Some(tx) = queued.remove(&next) {
            Self::push_tail(boxes, tx);
            next += 1;
            promoted += 1;
        }
        if queued.is_empty() {
            self.queue.remove(sender);
        }
        if promoted > 0 {
            tracing::debug!(
                sender = %hex::encode(sender),
                promoted,
                "promoted queued transactions to pending"
            );
        }
    }

    /// Replace the pending transaction at `tx.nonce`.
    ///
    /// The sender's whole pending chain is flattened, the transaction at
    /// the matching nonce substituted, and the chain refolded through
    /// [`push_tail`]: the prefix keeps its shape while the suffix
    /// re-chains under the new price.
    ///
    /// [`push_tail`]: TxPool::push_tail
    fn replace_pending(&mut self, tx: PoolTransaction) -> Result<(), MempoolError> {
        let sender = tx.sender;
        let nonce = tx.nonce;

        if self.config.price_bump_percent > 0 {
            let old_price = self
                .pending
                .get(&sender)
                .and_then(|boxes| boxes.iter().find_map(|b| b.price_of(nonce)));
            if let Some(old) = old_price {
                let min_price = old
                    .saturating_mul(U256::from(100 + self.config.price_bump_percent))
                    / U256::from(100);
                if tx.gas_price < min_price {
                    return Err(MempoolError::ReplaceUnderpriced {
                        old,
                        new: tx.gas_price,
                        min_bump_percent: self.config.price_bump_percent,
                    });
                }
            }
        }

        self.deindex_head(&sender);
        let boxes = self.pending.remove(&sender).unwrap_or_default();
        let mut rebuilt: Vec<TxBox> = Vec::new();
        let mut replacement = Some(tx);

        for txbox in boxes {
            for old in txbox.into_transactions() {
                let next = if old.nonce == nonce {
                    replacement.take().unwrap_or(old)
                } else {
                    old
                };
                Self::push_tail(&mut rebuilt, next);
            }
        }

        if !rebuilt.is_empty() {
            self.pending.insert(sender, rebuilt);
        }
        self.index_head(&sender);
        tracing::debug!(
            sender = %hex::encode(sender),
            nonce,
            "pending transaction replaced"
        );
        Ok(())
    }

    // =========================================================================
    // PRICE INDEX
    // =========================================================================

    /// Drop the sender's current head-box entry from the price view. Must
    /// run before any mutation that may change the head box.
    fn deindex_head(&mut self, sender: &Address) {
        if let Some(head) = self.pending.get(sender).and_then(|boxes| boxes.first()) {
            self.by_price
                .remove(&PricedBox::new(head.gas_price(), *sender));
        }
    }

    /// (Re-)insert the sender's head-box entry into the price view.
    fn index_head(&mut self, sender: &Address) {
        if let Some(head) = self.pending.get(sender).and_then(|boxes| boxes.first()) {
            self.by_price
                .insert(PricedBox::new(head.gas_price(), *sender));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::AccountReader;
    use shared_types::address_from_secret;

    /// Account nonces pinned in memory, standing in for the state trie.
    #[derive(Default)]
    struct StaticNonces(HashMap<Address, u64>);

    impl AccountReader for StaticNonces {
        fn account_nonce(&self, address: &Address) -> Result<u64, MempoolError> {
            Ok(self.0.get(address).copied().unwrap_or(0))
        }
    }

    fn secret(key: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = key;
        bytes
    }

    fn sender_of(key: u8) -> Address {
        address_from_secret(&secret(key)).unwrap()
    }

    fn signed_tx(key: u8, nonce: u64, gas_price: u64) -> SignedTransaction {
        signed_tx_with_value(key, nonce, gas_price, 10)
    }

    fn signed_tx_with_value(key: u8, nonce: u64, gas_price: u64, value: u64) -> SignedTransaction {
        let mut tx = SignedTransaction::new(
            nonce,
            Some([0xBB; 20]),
            U256::from(value),
            21_000,
            U256::from(gas_price),
            Vec::new(),
            U256::from(1u64),
        );
        tx.sign(&secret(key)).unwrap();
        tx
    }

    fn empty_pool() -> TxPool<StaticNonces> {
        TxPool::new(StaticNonces::default())
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    #[test]
    fn test_rejects_nonce_at_or_below_account_nonce() {
        let mut nonces = StaticNonces::default();
        nonces.0.insert(sender_of(1), 5);
        let mut pool = TxPool::new(nonces);

        for nonce in [5, 3] {
            let result = pool.submit(signed_tx(1, nonce, 1));
            assert!(matches!(result, Err(MempoolError::NonceTooLow { .. })));
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_rejects_unsigned_transaction() {
        let mut pool = empty_pool();
        let tx = SignedTransaction::new(
            1,
            Some([0xBB; 20]),
            U256::from(10u64),
            21_000,
            U256::from(1u64),
            Vec::new(),
            U256::from(1u64),
        );
        let result = pool.submit(tx);
        assert!(matches!(result, Err(MempoolError::SignatureInvalid(_))));
    }

    #[test]
    fn test_frontier_transaction_is_pending() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();

        assert_eq!(pool.pending_count(), 1);
        assert_eq!(pool.queued_count(), 0);

        let tx = pool.extract_one().unwrap();
        assert_eq!(tx.nonce, 1);
        assert_eq!(tx.sender, sender_of(1));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_gap_transaction_is_queued() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 3, 5)).unwrap();

        assert_eq!(pool.pending_count(), 0);
        assert_eq!(pool.queued_count(), 1);
        assert!(pool.extract_one().is_none());
    }

    #[test]
    fn test_gap_filling_promotes_in_order() {
        let mut pool = empty_pool();

        pool.submit(signed_tx(1, 3, 1)).unwrap();
        pool.submit(signed_tx(1, 2, 1)).unwrap();
        assert_eq!(pool.queued_count(), 2);
        assert_eq!(pool.pending_count(), 0);

        pool.submit(signed_tx(1, 1, 1)).unwrap();
        assert_eq!(pool.queued_count(), 0);
        assert_eq!(pool.pending_count(), 3);

        let nonces: Vec<u64> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| tx.nonce)
            .collect();
        assert_eq!(nonces, vec![1, 2, 3]);
    }

    #[test]
    fn test_promotion_stops_at_gap() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 2, 1)).unwrap();
        pool.submit(signed_tx(1, 3, 1)).unwrap();
        pool.submit(signed_tx(1, 5, 1)).unwrap();

        pool.submit(signed_tx(1, 1, 1)).unwrap();
        assert_eq!(pool.pending_count(), 3);
        assert_eq!(pool.queued_count(), 1);

        pool.submit(signed_tx(1, 4, 1)).unwrap();
        assert_eq!(pool.pending_count(), 5);
        assert_eq!(pool.queued_count(), 0);
    }

    #[test]
    fn test_queue_keeps_latest_for_same_nonce() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 3, 5)).unwrap();
        pool.submit(signed_tx(1, 3, 7)).unwrap();
        assert_eq!(pool.queued_count(), 1);

        pool.submit(signed_tx(1, 1, 9)).unwrap();
        pool.submit(signed_tx(1, 2, 9)).unwrap();

        let prices: Vec<U256> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| tx.gas_price)
            .collect();
        assert_eq!(prices[2], U256::from(7u64));
    }

    // =========================================================================
    // EXTRACTION ORDER
    // =========================================================================

    #[test]
    fn test_highest_gas_price_extracted_first() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(2, 1, 3)).unwrap();

        assert_eq!(pool.extract_one().unwrap().sender, sender_of(1));
        assert_eq!(pool.extract_one().unwrap().sender, sender_of(2));
        assert!(pool.extract_one().is_none());
    }

    #[test]
    fn test_price_tie_breaks_on_address() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(2, 1, 5)).unwrap();

        let first = pool.extract_one().unwrap().sender;
        let second = pool.extract_one().unwrap().sender;
        assert_eq!(first, first.min(second));
        assert_eq!(
            vec![first, second],
            {
                let mut expected = vec![sender_of(1), sender_of(2)];
                expected.sort();
                expected
            }
        );
    }

    #[test]
    fn test_sender_nonces_extracted_in_order() {
        let mut pool = empty_pool();
        // Descending prices: each transaction starts its own box.
        pool.submit(signed_tx(1, 1, 9)).unwrap();
        pool.submit(signed_tx(1, 2, 5)).unwrap();
        pool.submit(signed_tx(1, 3, 1)).unwrap();

        let nonces: Vec<u64> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| tx.nonce)
            .collect();
        assert_eq!(nonces, vec![1, 2, 3]);
    }

    #[test]
    fn test_cheaper_successor_box_yields_between_senders() {
        let mut pool = empty_pool();
        // Sender 1: nonce 1 at price 5, nonce 2 at price 1 (own box).
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(1, 2, 1)).unwrap();
        // Sender 2: a single transaction at price 3.
        pool.submit(signed_tx(2, 1, 3)).unwrap();

        let order: Vec<(Address, u64)> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| (tx.sender, tx.nonce))
            .collect();
        assert_eq!(
            order,
            vec![
                (sender_of(1), 1), // price 5
                (sender_of(2), 1), // price 3 beats the now-exposed price-1 box
                (sender_of(1), 2), // price 1
            ]
        );
    }

    #[test]
    fn test_same_price_chain_shares_one_box() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(1, 2, 5)).unwrap();
        pool.submit(signed_tx(2, 1, 4)).unwrap();

        // Both of sender 1's transactions sit in one price-5 box, so they
        // drain before sender 2 is considered.
        let order: Vec<(Address, u64)> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| (tx.sender, tx.nonce))
            .collect();
        assert_eq!(
            order,
            vec![(sender_of(1), 1), (sender_of(1), 2), (sender_of(2), 1)]
        );
    }

    #[test]
    fn test_extract_from_empty_pool() {
        let mut pool = empty_pool();
        assert!(pool.extract_one().is_none());
    }

    // =========================================================================
    // REPLACEMENT
    // =========================================================================

    #[test]
    fn test_replacement_is_unconditional_by_default() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 100)).unwrap();
        // Cheaper replacement still wins under the default config.
        pool.submit(signed_tx(1, 1, 1)).unwrap();

        assert_eq!(pool.pending_count(), 1);
        let tx = pool.extract_one().unwrap();
        assert_eq!(tx.gas_price, U256::from(1u64));
    }

    #[test]
    fn test_replacement_by_value_same_price() {
        let mut pool = empty_pool();
        pool.submit(signed_tx_with_value(1, 1, 5, 10)).unwrap();
        pool.submit(signed_tx_with_value(1, 1, 5, 99)).unwrap();

        assert_eq!(pool.pending_count(), 1);
        let tx = pool.extract_one().unwrap();
        assert_eq!(tx.transaction.value, U256::from(99u64));
    }

    #[test]
    fn test_mid_box_replacement_rechains_suffix() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(1, 2, 5)).unwrap();
        pool.submit(signed_tx(1, 3, 5)).unwrap();

        // Cut the box at nonce 2 with a cheaper transaction. The suffix
        // (nonce 3) re-chains behind it in a price-3 box.
        pool.submit(signed_tx(1, 2, 3)).unwrap();
        assert_eq!(pool.pending_count(), 3);

        // A competitor priced between the two boxes slots in after the
        // price-5 head but before the price-3 remainder.
        pool.submit(signed_tx(2, 1, 4)).unwrap();

        let order: Vec<(Address, u64)> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| (tx.sender, tx.nonce))
            .collect();
        assert_eq!(
            order,
            vec![
                (sender_of(1), 1),
                (sender_of(2), 1),
                (sender_of(1), 2),
                (sender_of(1), 3),
            ]
        );
    }

    #[test]
    fn test_head_replacement_updates_price_view() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 2)).unwrap();
        pool.submit(signed_tx(2, 1, 5)).unwrap();

        // Bump sender 1's head above sender 2.
        pool.submit(signed_tx(1, 1, 9)).unwrap();

        assert_eq!(pool.extract_one().unwrap().sender, sender_of(1));
        assert_eq!(pool.extract_one().unwrap().sender, sender_of(2));
    }

    #[test]
    fn test_replacement_keeps_nonce_continuity() {
        let mut pool = empty_pool();
        for nonce in 1..=4 {
            pool.submit(signed_tx(1, nonce, 5)).unwrap();
        }
        pool.submit(signed_tx(1, 3, 8)).unwrap();

        let nonces: Vec<u64> = std::iter::from_fn(|| pool.extract_one())
            .map(|tx| tx.nonce)
            .collect();
        assert_eq!(nonces, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_price_bump_extension() {
        let state = StaticNonces::default();
        let mut pool = TxPool::with_config(state, PoolConfig::with_price_bump(10));

        pool.submit(signed_tx(1, 1, 100)).unwrap();

        // 5% bump: rejected.
        let result = pool.submit(signed_tx(1, 1, 105));
        assert!(matches!(
            result,
            Err(MempoolError::ReplaceUnderpriced { .. })
        ));

        // 10% bump: accepted.
        pool.submit(signed_tx(1, 1, 110)).unwrap();
        assert_eq!(
            pool.extract_one().unwrap().gas_price,
            U256::from(110u64)
        );
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    #[test]
    fn test_status_counts() {
        let mut pool = empty_pool();
        pool.submit(signed_tx(1, 1, 5)).unwrap();
        pool.submit(signed_tx(1, 2, 5)).unwrap();
        pool.submit(signed_tx(1, 9, 5)).unwrap();
        pool.submit(signed_tx(2, 4, 5)).unwrap();

        let status = pool.status();
        assert_eq!(status.pending_count, 2);
        assert_eq!(status.queued_count, 2);
        assert_eq!(status.sender_count, 2);
    }
}
