//! Configuration scalar storage.

use crate::StoreError;
use custody_types::BridgeParams;

pub trait MetaStore {
    fn get_params(&self) -> Result<BridgeParams, StoreError>;
    fn put_params(&mut self, params: &BridgeParams) -> Result<(), StoreError>;
}
