//! Lending gateway: which principals may draw down and return pool liquidity

use crate::error::VaultError;
use crate::principal::Principal;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowerSet {
    borrowers: BTreeSet<Principal>,
}

impl BorrowerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable a borrower. Returns true if membership changed.
    pub fn set(&mut self, borrower: Principal, enabled: bool) -> bool {
        if enabled {
            self.borrowers.insert(borrower)
        } else {
            self.borrowers.remove(&borrower)
        }
    }

    pub fn contains(&self, principal: &Principal) -> bool {
        self.borrowers.contains(principal)
    }

    /// Gate a loan/repay call
    pub fn authorize(&self, caller: &Principal) -> Result<(), VaultError> {
        if !self.contains(caller) {
            log::warn!("Rejected borrower call from {}", caller);
            return Err(VaultError::Unauthorized(*caller));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Principal> {
        self.borrowers.iter()
    }

    pub fn len(&self) -> usize {
        self.borrowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borrowers.is_empty()
    }
}
