//! Asset custody adapter
//!
//! The pool never holds asset balances itself. All value movement goes through
//! a `Custody` implementation bound to the pool's own account (the custodian),
//! which either applies a transfer completely or refuses it.

use crate::principal::Principal;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("{holder} holds {available}, transfer needs {requested}")]
    InsufficientBalance {
        holder: Principal,
        available: u128,
        requested: u128,
    },
    #[error("balance of {0} would overflow")]
    Overflow(Principal),
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Fungible-asset ledger consumed by the pool
pub trait Custody {
    /// Account that holds pool custody
    fn custodian(&self) -> &Principal;

    /// Move `amount` from `from` into the custodian account
    fn transfer_in(&mut self, from: &Principal, amount: u128) -> Result<(), CustodyError>;

    /// Move `amount` from the custodian account to `to`
    fn transfer_out(&mut self, to: &Principal, amount: u128) -> Result<(), CustodyError>;

    fn balance_of(&self, holder: &Principal) -> u128;

    /// Physical balance held by the pool
    fn custody(&self) -> u128 {
        self.balance_of(self.custodian())
    }
}

/// In-process asset ledger
#[derive(Debug, Clone)]
pub struct MemoryCustody {
    custodian: Principal,
    balances: HashMap<Principal, u128>,
}

impl MemoryCustody {
    pub fn new(custodian: Principal) -> Self {
        Self {
            custodian,
            balances: HashMap::new(),
        }
    }

    /// Seed balances, e.g. from configuration
    pub fn with_balances<I>(custodian: Principal, balances: I) -> Result<Self, CustodyError>
    where
        I: IntoIterator<Item = (Principal, u128)>,
    {
        let mut custody = Self::new(custodian);
        for (holder, amount) in balances {
            custody.mint(&holder, amount)?;
        }
        Ok(custody)
    }

    /// Create `amount` of asset out of thin air for `holder`
    pub fn mint(&mut self, holder: &Principal, amount: u128) -> Result<(), CustodyError> {
        let balance = self.balances.entry(*holder).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::Overflow(*holder))?;
        Ok(())
    }

    /// Plain transfer between any two accounts
    pub fn transfer(&mut self, from: &Principal, to: &Principal, amount: u128) -> Result<(), CustodyError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                holder: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(CustodyError::Overflow(*to))?;

        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl Custody for MemoryCustody {
    fn custodian(&self) -> &Principal {
        &self.custodian
    }

    fn transfer_in(&mut self, from: &Principal, amount: u128) -> Result<(), CustodyError> {
        let custodian = self.custodian;
        self.transfer(from, &custodian, amount)
    }

    fn transfer_out(&mut self, to: &Principal, amount: u128) -> Result<(), CustodyError> {
        let custodian = self.custodian;
        self.transfer(&custodian, to, amount)
    }

    fn balance_of(&self, holder: &Principal) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }
}
