//! In-memory token ledger.

use crate::error::TokenError;
use crate::operation::{Entrypoint, TokenLedger, TokenOperation};
use custody_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A balance-tracking token ledger kept entirely in memory.
///
/// `burn` destroys tokens held by the configured redeem account, matching a
/// token contract whose burn entrypoint debits a fixed holder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryToken {
    balances: BTreeMap<Address, u128>,
    total_supply: u128,
    redeem_account: Address,
    missing: BTreeSet<Entrypoint>,
}

impl MemoryToken {
    pub fn new(redeem_account: Address) -> Self {
        Self {
            balances: BTreeMap::new(),
            total_supply: 0,
            redeem_account,
            missing: BTreeSet::new(),
        }
    }

    /// A ledger that does not expose `entrypoint`.
    pub fn without_entrypoint(mut self, entrypoint: Entrypoint) -> Self {
        self.missing.insert(entrypoint);
        self
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn redeem_account(&self) -> &Address {
        &self.redeem_account
    }

    /// Seed `account` with `amount` new tokens, as a mint would.
    pub fn credit(&mut self, account: &Address, amount: u128) -> Result<(), TokenError> {
        self.apply(&TokenOperation::Mint {
            to: account.clone(),
            amount,
        })
    }

    fn debit(&mut self, account: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: account.to_string(),
                needed: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), remaining);
        }
        Ok(())
    }

    fn deposit(&mut self, account: &Address, amount: u128) -> Result<(), TokenError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        if balance > 0 {
            self.balances.insert(account.clone(), balance);
        }
        Ok(())
    }

    fn apply(&mut self, op: &TokenOperation) -> Result<(), TokenError> {
        match op {
            TokenOperation::Transfer { from, to, amount } => {
                self.debit(from, *amount)?;
                self.deposit(to, *amount)
            }
            TokenOperation::Mint { to, amount } => {
                self.total_supply = self
                    .total_supply
                    .checked_add(*amount)
                    .ok_or(TokenError::Overflow)?;
                self.deposit(to, *amount)
            }
            TokenOperation::Burn { amount } => {
                let redeem = self.redeem_account.clone();
                self.debit(&redeem, *amount)?;
                self.total_supply -= *amount;
                Ok(())
            }
        }
    }
}

impl TokenLedger for MemoryToken {
    fn has_entrypoint(&self, entrypoint: Entrypoint) -> bool {
        !self.missing.contains(&entrypoint)
    }

    fn execute(&mut self, ops: &[TokenOperation]) -> Result<(), TokenError> {
        if let Some(op) = ops.iter().find(|op| !self.has_entrypoint(op.entrypoint())) {
            return Err(TokenError::MissingEntrypoint(op.entrypoint().name()));
        }
        // Work on a copy so a failing operation leaves no partial effect.
        let mut next = self.clone();
        for op in ops {
            next.apply(op)?;
        }
        debug!(ops = ops.len(), supply = next.total_supply, "token batch executed");
        *self = next;
        Ok(())
    }
}
