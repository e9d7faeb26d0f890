//! Burn shares, pay out pro rata value

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::Pool;
use pool_model::transitions;

/// Process withdraw instruction
///
/// Pays `floor(shares * reserve / total_shares)`. Fails with
/// `InsufficientLiquidity` when outstanding loans have drawn the accounted
/// custody below that amount; the holder can register demand with `request_withdraw`
/// and retry once liquidity returns.
///
/// # Returns
/// Asset paid to `caller`
pub fn process_withdraw<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    shares: u128,
) -> Result<u128, VaultError> {
    let available = pool.available_liquidity();
    let staged = transitions::withdraw(&pool.state, caller, shares, available)?;
    log::debug!("Withdraw: {} burns {} shares for {}", caller, shares, staged.outcome);

    let owed = pool.commit(caller, staged)?;

    log::info!(
        "Withdraw: {} burned {} shares, received {} (supply {}, reserve {})",
        caller,
        shares,
        owed,
        pool.total_supply(),
        pool.reserve()
    );
    Ok(owed)
}
