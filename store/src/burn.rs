//! Burn request storage and the monotonic burn id counter.

use crate::StoreError;
use custody_types::{BurnId, BurnRequest};

pub trait BurnStore {
    fn get_burn(&self, id: BurnId) -> Result<Option<BurnRequest>, StoreError>;

    /// Store a burn under `burn.id`, replacing any previous entry.
    fn put_burn(&mut self, burn: &BurnRequest) -> Result<(), StoreError>;
    fn delete_burn(&mut self, id: BurnId) -> Result<(), StoreError>;
    fn iter_burns(&self) -> Result<Vec<BurnRequest>, StoreError>;

    /// The id the next proposed burn will receive.
    fn burn_id_counter(&self) -> Result<BurnId, StoreError>;
    fn put_burn_id_counter(&mut self, next: BurnId) -> Result<(), StoreError>;
}
