//! State transition functions - all total, no panics
//!
//! Each transition reads the current state and returns the writes it would
//! make together with the asset movement needed to commit them. The input
//! state is never touched, so a rejected operation leaves nothing behind.

use crate::math::*;
use crate::state::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("amount is zero or exceeds the available balance")]
    InvalidAmount,
    #[error("pool custody {available} cannot cover payout {owed}")]
    InsufficientLiquidity { owed: u128, available: u128 },
    #[error("pool can pay this withdrawal now")]
    UseDirectWithdraw,
    #[error("pool has outstanding shares but no reserve")]
    Insolvent,
    #[error("arithmetic overflow")]
    Overflow,
}

/// Asset movement between the caller and pool custody
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    None,
    /// Pull from the caller into the pool
    In(u128),
    /// Push from the pool to the caller
    Out(u128),
}

/// Realized trading result of a repayment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    Even,
    Gain(u128),
    Loss(u128),
}

/// Writes plus the movement required to commit them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Staged<K, R> {
    pub effects: Effects<K>,
    pub movement: Movement,
    pub outcome: R,
}

fn checked(v: Option<u128>) -> Result<u128, ModelError> {
    v.ok_or(ModelError::Overflow)
}

/// Shares minted for `amount` of asset: 1:1 on an empty pool, pro rata otherwise
pub fn shares_for_deposit<K: Ord + Clone>(s: &PoolState<K>, amount: u128) -> Result<u128, ModelError> {
    let t = &s.totals;
    if t.total_shares == 0 {
        return Ok(amount);
    }
    if t.reserve == 0 {
        return Err(ModelError::Insolvent);
    }
    checked(mul_div_floor(amount, t.total_shares, t.reserve))
}

/// Asset owed for burning `shares`: floor(shares * reserve / total_shares)
pub fn payout_for_shares<K: Ord + Clone>(s: &PoolState<K>, shares: u128) -> Result<u128, ModelError> {
    let t = &s.totals;
    if t.total_shares == 0 {
        return Ok(0);
    }
    checked(mul_div_floor(shares, t.reserve, t.total_shares))
}

fn validate_share_amount<K: Ord + Clone>(
    s: &PoolState<K>,
    holder: &K,
    shares: u128,
) -> Result<ShareAccount, ModelError> {
    let account = s.account(holder);
    if shares == 0 || shares > account.shares {
        return Err(ModelError::InvalidAmount);
    }
    Ok(account)
}

/// Deposit `amount` of asset, minting shares to `holder`
pub fn deposit<K: Ord + Clone>(
    s: &PoolState<K>,
    holder: &K,
    amount: u128,
) -> Result<Staged<K, u128>, ModelError> {
    if amount == 0 {
        return Err(ModelError::InvalidAmount);
    }

    let minted = shares_for_deposit(s, amount)?;
    if minted == 0 {
        // Truncated to nothing: the caller would donate the whole amount
        return Err(ModelError::InvalidAmount);
    }

    let mut account = s.account(holder);
    account.shares = checked(add_u128(account.shares, minted))?;

    let mut totals = s.totals;
    totals.total_shares = checked(add_u128(totals.total_shares, minted))?;
    totals.reserve = checked(add_u128(totals.reserve, amount))?;

    Ok(Staged {
        effects: Effects { totals, account: Some((holder.clone(), account)), loan: None },
        movement: Movement::In(amount),
        outcome: minted,
    })
}

/// Burn `shares` from `holder` and pay out their pro rata value.
///
/// `custody` is the liquidity the pool can pay out: the accounted balance
/// `reserve - total_loan`, never funds that have not been booked yet. The
/// holder's pending withdrawal request is consumed by up to `shares`.
pub fn withdraw<K: Ord + Clone>(
    s: &PoolState<K>,
    holder: &K,
    shares: u128,
    custody: u128,
) -> Result<Staged<K, u128>, ModelError> {
    let mut account = validate_share_amount(s, holder, shares)?;

    let owed = payout_for_shares(s, shares)?;
    if custody < owed {
        return Err(ModelError::InsufficientLiquidity { owed, available: custody });
    }

    account.shares = checked(sub_u128(account.shares, shares))?;
    // Burning shares consumes the holder's own request; a full exit clears it
    let consumed = if account.shares == 0 {
        account.pending_withdraw_request
    } else {
        account.pending_withdraw_request.min(shares)
    };
    account.pending_withdraw_request = checked(sub_u128(account.pending_withdraw_request, consumed))?;

    let mut totals = s.totals;
    totals.total_shares = checked(sub_u128(totals.total_shares, shares))?;
    totals.reserve = checked(sub_u128(totals.reserve, owed))?;
    totals.total_request_withdraw = checked(sub_u128(totals.total_request_withdraw, consumed))?;

    Ok(Staged {
        effects: Effects { totals, account: Some((holder.clone(), account)), loan: None },
        movement: Movement::Out(owed),
        outcome: owed,
    })
}

/// Register withdrawal demand the pool cannot currently serve.
///
/// Only valid while `custody` is below the payout for `shares`. Requests
/// accumulate; returns the holder's pending total.
pub fn request_withdraw<K: Ord + Clone>(
    s: &PoolState<K>,
    holder: &K,
    shares: u128,
    custody: u128,
) -> Result<Staged<K, u128>, ModelError> {
    let mut account = validate_share_amount(s, holder, shares)?;

    let owed = payout_for_shares(s, shares)?;
    if custody >= owed {
        return Err(ModelError::UseDirectWithdraw);
    }

    account.pending_withdraw_request = checked(add_u128(account.pending_withdraw_request, shares))?;

    let mut totals = s.totals;
    totals.total_request_withdraw = checked(add_u128(totals.total_request_withdraw, shares))?;

    Ok(Staged {
        effects: Effects { totals, account: Some((holder.clone(), account)), loan: None },
        movement: Movement::None,
        outcome: account.pending_withdraw_request,
    })
}

/// Lend `amount` to `borrower` out of `custody`, the accounted liquidity.
/// Reserve is untouched: the loan stays pool equity.
pub fn loan<K: Ord + Clone>(
    s: &PoolState<K>,
    borrower: &K,
    amount: u128,
    custody: u128,
) -> Result<Staged<K, ()>, ModelError> {
    if amount == 0 {
        return Err(ModelError::InvalidAmount);
    }
    if custody < amount {
        return Err(ModelError::InsufficientLiquidity { owed: amount, available: custody });
    }

    let outstanding = checked(add_u128(s.loan_of(borrower), amount))?;

    let mut totals = s.totals;
    totals.total_loan = checked(add_u128(totals.total_loan, amount))?;

    Ok(Staged {
        effects: Effects { totals, account: None, loan: Some((borrower.clone(), outstanding)) },
        movement: Movement::Out(amount),
        outcome: (),
    })
}

/// Close `principal` of `borrower`'s loan with `returned` of asset.
///
/// reserve += returned - principal, so a shortfall is a loss for every
/// shareholder and a surplus a gain, both through NAV per share.
pub fn repay<K: Ord + Clone>(
    s: &PoolState<K>,
    borrower: &K,
    principal: u128,
    returned: u128,
) -> Result<Staged<K, Settlement>, ModelError> {
    let outstanding = s.loan_of(borrower);
    if principal > outstanding || (principal == 0 && returned == 0) {
        return Err(ModelError::InvalidAmount);
    }

    let mut totals = s.totals;
    totals.total_loan = checked(sub_u128(totals.total_loan, principal))?;
    totals.reserve = checked(sub_u128(checked(add_u128(totals.reserve, returned))?, principal))?;

    let settlement = if returned > principal {
        Settlement::Gain(returned - principal)
    } else if returned < principal {
        Settlement::Loss(principal - returned)
    } else {
        Settlement::Even
    };

    Ok(Staged {
        effects: Effects {
            totals,
            account: None,
            loan: Some((borrower.clone(), outstanding - principal)),
        },
        movement: Movement::In(returned),
        outcome: settlement,
    })
}
