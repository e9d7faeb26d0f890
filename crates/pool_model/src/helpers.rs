//! Invariant checking helpers

use crate::math::*;
use crate::state::*;
use crate::transitions::payout_for_shares;

/// Custody invariant: physical balance equals reserve - total_loan
pub fn custody_matches<K: Ord + Clone>(s: &PoolState<K>, custody: u128) -> bool {
    s.totals.reserve >= s.totals.total_loan && custody == s.expected_custody()
}

/// Per-entry sums agree with the pool-wide totals
pub fn ledger_consistent<K: Ord + Clone>(s: &PoolState<K>) -> bool {
    let shares = s.accounts.values().try_fold(0u128, |acc, a| add_u128(acc, a.shares));
    let pending = s
        .accounts
        .values()
        .try_fold(0u128, |acc, a| add_u128(acc, a.pending_withdraw_request));
    let loans = s.loans.values().try_fold(0u128, |acc, l| add_u128(acc, *l));

    shares == Some(s.totals.total_shares)
        && pending == Some(s.totals.total_request_withdraw)
        && loans == Some(s.totals.total_loan)
}

/// NAV per share scaled by `scale` (e.g. 1_000_000); `None` on an empty pool
pub fn nav_per_share_scaled<K: Ord + Clone>(s: &PoolState<K>, scale: u128) -> Option<u128> {
    if s.totals.total_shares == 0 {
        return None;
    }
    mul_div_floor(s.totals.reserve, scale, s.totals.total_shares)
}

/// Asset a holder would receive for all their shares at the current NAV
pub fn redeemable_value<K: Ord + Clone>(s: &PoolState<K>, holder: &K) -> u128 {
    payout_for_shares(s, s.shares_of(holder)).unwrap_or(0)
}

/// Asset value of all registered withdrawal demand at the current NAV
pub fn pending_request_value<K: Ord + Clone>(s: &PoolState<K>) -> u128 {
    payout_for_shares(s, s.totals.total_request_withdraw).unwrap_or(u128::MAX)
}

/// How much custody is missing to serve every pending request
pub fn liquidity_shortfall<K: Ord + Clone>(s: &PoolState<K>, custody: u128) -> u128 {
    pending_request_value(s).saturating_sub(custody)
}

/// Share of reserve that is lent out, in basis points
pub fn utilization_bps<K: Ord + Clone>(s: &PoolState<K>) -> u128 {
    mul_div_floor(s.totals.total_loan, 10_000, s.totals.reserve).unwrap_or(0)
}
