//! Register withdrawal demand the pool cannot serve yet

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::Pool;
use pool_model::transitions;

/// Process request-withdraw instruction
///
/// Advisory only: records demand so borrowers and operators can see that
/// liquidity must come back. No shares are burned and nothing is settled
/// automatically; the holder retries `withdraw` later.
///
/// # Returns
/// The caller's accumulated pending request, in shares
pub fn process_request_withdraw<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    shares: u128,
) -> Result<u128, VaultError> {
    let available = pool.available_liquidity();
    let staged = transitions::request_withdraw(&pool.state, caller, shares, available)?;

    let pending = pool.commit(caller, staged)?;

    log::info!(
        "RequestWithdraw: {} requested {} shares (pending {}, pool total {})",
        caller,
        shares,
        pending,
        pool.total_request_withdraw()
    );
    Ok(pending)
}
