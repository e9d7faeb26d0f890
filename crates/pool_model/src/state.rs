//! Pure state model for the pool ledger

use std::collections::BTreeMap;

/// Per-holder share balance and withdrawal demand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShareAccount {
    pub shares: u128,
    pub pending_withdraw_request: u128, // Accumulates across requests, advisory only
}

impl ShareAccount {
    /// An account with nothing in it is dropped from the ledger
    pub fn is_empty(&self) -> bool {
        self.shares == 0 && self.pending_withdraw_request == 0
    }
}

/// Pool-wide counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_shares: u128,
    pub reserve: u128,    // Notional value backing all shares
    pub total_loan: u128, // Principal lent out and not yet repaid
    pub total_request_withdraw: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolState<K: Ord> {
    pub totals: Totals,
    pub accounts: BTreeMap<K, ShareAccount>,
    pub loans: BTreeMap<K, u128>, // Outstanding principal per borrower
}

/// A set of writes against `PoolState`.
///
/// Every ledger operation touches the totals, at most one share account and
/// at most one loan entry. Applying an `Effects` returns the writes that undo
/// it, so a failed custody movement can be rolled back exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effects<K> {
    pub totals: Totals,
    pub account: Option<(K, ShareAccount)>,
    pub loan: Option<(K, u128)>,
}

impl<K: Ord> Default for PoolState<K> {
    fn default() -> Self {
        Self {
            totals: Totals::default(),
            accounts: BTreeMap::new(),
            loans: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> PoolState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, holder: &K) -> ShareAccount {
        self.accounts.get(holder).copied().unwrap_or_default()
    }

    pub fn shares_of(&self, holder: &K) -> u128 {
        self.account(holder).shares
    }

    pub fn pending_of(&self, holder: &K) -> u128 {
        self.account(holder).pending_withdraw_request
    }

    pub fn loan_of(&self, borrower: &K) -> u128 {
        self.loans.get(borrower).copied().unwrap_or(0)
    }

    /// Custody the pool must hold for the ledger to balance: reserve - total_loan
    pub fn expected_custody(&self) -> u128 {
        self.totals.reserve.saturating_sub(self.totals.total_loan)
    }

    /// Apply a set of writes and return the writes that restore the previous state
    pub fn apply(&mut self, effects: Effects<K>) -> Effects<K> {
        let totals = std::mem::replace(&mut self.totals, effects.totals);

        let account = effects.account.map(|(holder, next)| {
            let previous = if next.is_empty() {
                self.accounts.remove(&holder)
            } else {
                self.accounts.insert(holder.clone(), next)
            };
            (holder, previous.unwrap_or_default())
        });

        let loan = effects.loan.map(|(borrower, next)| {
            let previous = if next == 0 {
                self.loans.remove(&borrower)
            } else {
                self.loans.insert(borrower.clone(), next)
            };
            (borrower, previous.unwrap_or(0))
        });

        Effects { totals, account, loan }
    }
}
