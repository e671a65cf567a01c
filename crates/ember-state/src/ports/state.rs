use crate::domain::errors::StateError;
use shared_types::{Account, Address, Hash};

/// The account-state surface consumed by execution and query layers.
///
/// Reads of unknown addresses yield the zero account; the root hash
/// commits to the full account set after every write.
pub trait AccountStore {
    fn get_account(&self, address: &Address) -> Result<Account, StateError>;

    fn put_account(&mut self, address: &Address, account: &Account) -> Result<(), StateError>;

    fn account_exists(&self, address: &Address) -> Result<bool, StateError>;

    fn root_hash(&self) -> Hash;
}
