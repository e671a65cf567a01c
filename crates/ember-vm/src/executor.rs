//! The execution engine: transaction validation, transfer and
//! contract-creation accounting, and the capped faucet.

use crate::errors::VmError;
use ember_state::{KvStore, StateDb};
use parking_lot::RwLock;
use shared_types::{contract_address, Account, Address, SignedTransaction, U256};
use std::collections::HashMap;
use std::sync::Arc;

/// Units credited per faucet mint.
pub const MINT_AMOUNT: u64 = 1_000_000;

/// Maximum mints per address over the lifetime of one engine instance.
pub const MINT_LIMIT: u32 = 5;

/// The state transition engine.
///
/// Holds a shared handle to the account database and takes the write side
/// of the lock for the duration of each operation. The mint counter is
/// in-memory state of this instance, not part of the trie: a restart (or a
/// second engine over the same trie) starts counting from zero.
pub struct Vm<S: KvStore> {
    state: Arc<RwLock<StateDb<S>>>,
    mint_counts: HashMap<Address, u32>,
}

impl<S: KvStore> Vm<S> {
    pub fn new(state: Arc<RwLock<StateDb<S>>>) -> Self {
        Self {
            state,
            mint_counts: HashMap::new(),
        }
    }

    /// The shared state handle.
    pub fn state(&self) -> Arc<RwLock<StateDb<S>>> {
        Arc::clone(&self.state)
    }

    /// Read an account (for balance queries); missing accounts are zero.
    pub fn get_account(&self, address: &Address) -> Result<Account, VmError> {
        Ok(self.state.read().get_account(address)?)
    }

    /// How many times `address` has been minted to on this instance.
    pub fn mint_count(&self, address: &Address) -> u32 {
        self.mint_counts.get(address).copied().unwrap_or(0)
    }

    /// Credit the faucet amount to `address`, at most [`MINT_LIMIT`] times
    /// per address.
    ///
    /// # Errors
    /// `MintLimitExceeded` once the per-address cap is reached.
    pub fn mint(&mut self, address: &Address) -> Result<(), VmError> {
        let count = self.mint_count(address);
        if count >= MINT_LIMIT {
            return Err(VmError::MintLimitExceeded { address: *address });
        }

        let mut state = self.state.write();
        let mut account = state.get_account(address)?;
        account.balance = account.balance.saturating_add(MINT_AMOUNT);
        state.put_account(address, &account)?;
        drop(state);

        self.mint_counts.insert(*address, count + 1);
        tracing::info!(
            address = %hex::encode(address),
            balance = account.balance,
            mints = count + 1,
            "faucet mint"
        );
        Ok(())
    }

    /// Validate and apply a signed transaction.
    ///
    /// The full `gas_price * gas_limit` is charged along with the value;
    /// unused gas is not refunded. The sender's nonce is incremented by
    /// one; the transaction's own nonce field is not checked here, the
    /// pool is responsible for feeding transactions in order.
    ///
    /// Every rejection leaves the state untouched: all reads and checks
    /// precede the first write.
    pub fn execute(&mut self, tx: &SignedTransaction) -> Result<(), VmError> {
        if tx.gas_price.is_zero() {
            return Err(VmError::InvalidTransaction("gas price must be positive"));
        }
        if tx.gas_limit == 0 {
            return Err(VmError::InvalidTransaction("gas limit must be positive"));
        }

        let sender = tx.recover_sender().map_err(|_| VmError::InvalidSender)?;

        let mut state = self.state.write();
        let sender_account = state.get_account(&sender)?;

        let cost = tx.total_cost();
        if cost > U256::from(sender_account.balance) {
            return Err(VmError::InsufficientBalance {
                required: cost,
                available: sender_account.balance,
            });
        }
        // Both fit in u64: cost <= sender balance, value <= cost.
        let cost_units = cost.low_u64();
        let value_units = tx.value.low_u64();

        if tx.is_contract_creation() {
            self.create_contract(&mut state, tx, sender, sender_account, cost_units, value_units)
        } else {
            self.transfer(&mut state, tx, sender, sender_account, cost_units, value_units)
        }
    }

    fn create_contract(
        &self,
        state: &mut StateDb<S>,
        tx: &SignedTransaction,
        sender: Address,
        sender_account: Account,
        cost_units: u64,
        value_units: u64,
    ) -> Result<(), VmError> {
        let address = contract_address(&sender, tx.nonce);
        if state.account_exists(&address)? {
            return Err(VmError::AddressCollision { address });
        }

        let mut debited = sender_account;
        debited.balance = debited.balance.checked_sub(cost_units).ok_or(
            VmError::InsufficientBalance {
                required: U256::from(cost_units),
                available: debited.balance,
            },
        )?;
        debited.nonce += 1;

        let mut created = Account::new_contract(tx.data.clone());
        created.balance = value_units;

        // Both records are complete before either write; the root only
        // moves once the second write lands.
        state.put_account(&sender, &debited)?;
        state.put_account(&address, &created)?;

        tracing::info!(
            sender = %hex::encode(sender),
            contract = %hex::encode(address),
            code_len = tx.data.len(),
            endowment = value_units,
            "contract created"
        );
        Ok(())
    }

    fn transfer(
        &self,
        state: &mut StateDb<S>,
        tx: &SignedTransaction,
        sender: Address,
        sender_account: Account,
        cost_units: u64,
        value_units: u64,
    ) -> Result<(), VmError> {
        let recipient = tx
            .to
            .ok_or(VmError::InvalidTransaction("transfer without recipient"))?;

        if recipient == sender {
            // Self-transfer: the value round-trips, only gas is lost.
            let mut account = sender_account;
            account.balance = account
                .balance
                .checked_sub(cost_units)
                .and_then(|b| b.checked_add(value_units))
                .ok_or(VmError::InsufficientBalance {
                    required: U256::from(cost_units),
                    available: account.balance,
                })?;
            account.nonce += 1;
            state.put_account(&sender, &account)?;
            return Ok(());
        }

        let recipient_account = state.get_account(&recipient)?;
        let credited_balance = recipient_account.balance.checked_add(value_units).ok_or(
            VmError::InsufficientBalance {
                required: tx.value,
                available: u64::MAX - recipient_account.balance,
            },
        )?;

        let mut debited = sender_account;
        debited.balance = debited.balance.checked_sub(cost_units).ok_or(
            VmError::InsufficientBalance {
                required: U256::from(cost_units),
                available: debited.balance,
            },
        )?;
        debited.nonce += 1;

        let mut credited = recipient_account;
        credited.balance = credited_balance;

        state.put_account(&sender, &debited)?;
        state.put_account(&recipient, &credited)?;

        if credited.has_code() {
            // Reserved for contract execution; the value has moved, the
            // code is not interpreted.
            tracing::trace!(
                recipient = %hex::encode(recipient),
                "recipient carries code, call body skipped"
            );
        }

        tracing::debug!(
            sender = %hex::encode(sender),
            recipient = %hex::encode(recipient),
            value = value_units,
            gas_charged = cost_units - value_units,
            "transfer applied"
        );
        Ok(())
    }
}
