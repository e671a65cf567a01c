//! Value objects for the pool: the extraction-order key and status
//! snapshots.

use shared_types::{Address, U256};
use std::cmp::Ordering;

/// The global extraction-order key: one entry per sender with pending
/// transactions, keyed by the sender's head-box gas price.
///
/// Implements `Ord` such that higher gas price sorts first; ties fall back
/// to ascending sender address, which keeps extraction deterministic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PricedBox {
    /// Head-box gas price.
    pub gas_price: U256,
    /// The sender whose head box this is.
    pub sender: Address,
}

impl PricedBox {
    pub fn new(gas_price: U256, sender: Address) -> Self {
        Self { gas_price, sender }
    }
}

impl Ord for PricedBox {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher gas price = earlier in iteration order (reversed compare),
        // then ascending address as the deterministic tiebreak.
        other
            .gas_price
            .cmp(&self.gas_price)
            .then_with(|| self.sender.cmp(&other.sender))
    }
}

impl PartialOrd for PricedBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pool status snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStatus {
    /// Executable transactions across all senders.
    pub pending_count: usize,
    /// Parked transactions waiting on a nonce gap.
    pub queued_count: usize,
    /// Senders with at least one transaction in the pool.
    pub sender_count: usize,
}
