//! Liquidity assessment from pool snapshots

use liquidity_vault::PoolSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityStatus {
    /// No withdrawal demand registered
    Idle,
    /// Custody covers every pending request
    Serviceable,
    /// Available liquidity is short of pending demand by this much
    Short(u128),
}

/// What the keeper needs to know about pool liquidity at one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityReport {
    pub custody: u128,
    /// Custody withdrawals may draw on
    pub available: u128,
    pub reserve: u128,
    pub total_loan: u128,
    pub pending_shares: u128,
    /// Asset owed for all pending shares at current NAV
    pub pending_value: u128,
    pub shortfall: u128,
    pub utilization_bps: u128,
    /// Custody matches reserve - total_loan
    pub balanced: bool,
}

impl LiquidityReport {
    pub fn from_snapshot(snapshot: &PoolSnapshot) -> Self {
        Self {
            custody: snapshot.custody,
            available: snapshot.available_liquidity,
            reserve: snapshot.reserve,
            total_loan: snapshot.total_loan,
            pending_shares: snapshot.total_request_withdraw,
            pending_value: snapshot.pending_request_value,
            shortfall: snapshot.liquidity_shortfall,
            utilization_bps: snapshot.utilization_bps,
            balanced: snapshot.balanced(),
        }
    }

    pub fn status(&self) -> LiquidityStatus {
        if self.pending_shares == 0 {
            LiquidityStatus::Idle
        } else if self.shortfall > 0 {
            LiquidityStatus::Short(self.shortfall)
        } else {
            LiquidityStatus::Serviceable
        }
    }
}
