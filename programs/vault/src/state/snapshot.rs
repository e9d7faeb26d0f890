//! Point-in-time views of the pool for operators and the keeper

use crate::custody::Custody;
use crate::principal::Principal;
use crate::state::pool::{Pool, RepayMode};
use pool_model::{
    liquidity_shortfall, nav_per_share_scaled, pending_request_value, redeemable_value,
    utilization_bps,
};
use serde::{Deserialize, Serialize};

/// NAV per share is reported scaled by 1e6
pub const NAV_SCALE: u128 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub holder: Principal,
    pub shares: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerLoan {
    pub borrower: Principal,
    pub outstanding: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub custodian: Principal,
    pub owner: Principal,
    pub reserve: u128,
    pub total_loan: u128,
    pub total_supply: u128,
    pub total_request_withdraw: u128,
    /// Physical balance, should equal reserve - total_loan
    pub custody: u128,
    /// Custody that withdrawals and loans may draw on
    pub available_liquidity: u128,
    pub flash_fee_rate: u64,
    pub repay_mode: RepayMode,
    pub nav_per_share_e6: Option<u128>,
    pub utilization_bps: u128,
    /// Asset value of all pending withdrawal requests at current NAV
    pub pending_request_value: u128,
    pub liquidity_shortfall: u128,
    pub authorized_borrowers: Vec<Principal>,
    pub pending_requests: Vec<PendingRequest>,
    pub loans: Vec<BorrowerLoan>,
}

impl PoolSnapshot {
    pub fn capture<C: Custody>(pool: &Pool<C>) -> Self {
        let state = pool.state();
        let custody = pool.custody();
        let available = pool.available_liquidity();

        let pending_requests = state
            .accounts
            .iter()
            .filter(|(_, a)| a.pending_withdraw_request > 0)
            .map(|(holder, a)| PendingRequest {
                holder: *holder,
                shares: a.pending_withdraw_request,
            })
            .collect();

        let loans = state
            .loans
            .iter()
            .map(|(borrower, outstanding)| BorrowerLoan {
                borrower: *borrower,
                outstanding: *outstanding,
            })
            .collect();

        Self {
            custodian: *pool.asset().custodian(),
            owner: *pool.owner(),
            reserve: pool.reserve(),
            total_loan: pool.total_loan(),
            total_supply: pool.total_supply(),
            total_request_withdraw: pool.total_request_withdraw(),
            custody,
            available_liquidity: available,
            flash_fee_rate: pool.flash_fee_rate(),
            repay_mode: pool.repay_mode(),
            nav_per_share_e6: nav_per_share_scaled(state, NAV_SCALE),
            utilization_bps: utilization_bps(state),
            pending_request_value: pending_request_value(state),
            liquidity_shortfall: liquidity_shortfall(state, available),
            authorized_borrowers: pool.borrowers().iter().copied().collect(),
            pending_requests,
            loans,
        }
    }

    /// Custody invariant as seen in this snapshot
    pub fn balanced(&self) -> bool {
        self.reserve >= self.total_loan && self.custody == self.reserve - self.total_loan
    }
}

/// One holder's position in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderView {
    pub holder: Principal,
    pub shares: u128,
    pub pending_withdraw_request: u128,
    /// Asset the holder would receive for all shares at current NAV
    pub redeemable: u128,
    pub outstanding_loan: u128,
}

impl HolderView {
    pub fn capture<C: Custody>(pool: &Pool<C>, holder: &Principal) -> Self {
        let state = pool.state();
        Self {
            holder: *holder,
            shares: state.shares_of(holder),
            pending_withdraw_request: state.pending_of(holder),
            redeemable: redeemable_value(state, holder),
            outstanding_loan: state.loan_of(holder),
        }
    }
}
