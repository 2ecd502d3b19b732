//! Verified-user whitelist managed by gatekeepers.

use crate::StoreError;
use custody_types::Address;

pub trait WhitelistStore {
    fn is_whitelisted(&self, address: &Address) -> Result<bool, StoreError>;
    fn put_whitelisted(&mut self, address: &Address) -> Result<(), StoreError>;

    /// Remove an address. Removing an absent address is not an error.
    fn delete_whitelisted(&mut self, address: &Address) -> Result<(), StoreError>;
    fn iter_whitelisted(&self) -> Result<Vec<Address>, StoreError>;
}
