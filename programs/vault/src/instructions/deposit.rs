//! Deposit asset, mint shares

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::Pool;
use pool_model::transitions;

/// Process deposit instruction
///
/// Mints `amount` shares on an empty pool, otherwise
/// `floor(amount * total_shares / reserve)`; truncation stays with the pool.
/// The asset is pulled from `caller` after the ledger is updated.
///
/// # Returns
/// Shares minted to `caller`
pub fn process_deposit<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    amount: u128,
) -> Result<u128, VaultError> {
    let staged = transitions::deposit(&pool.state, caller, amount)?;
    log::debug!("Deposit: {} mints {} shares for {}", caller, staged.outcome, amount);

    let minted = pool.commit(caller, staged)?;

    log::info!(
        "Deposit: {} deposited {}, minted {} (supply {}, reserve {})",
        caller,
        amount,
        minted,
        pool.total_supply(),
        pool.reserve()
    );
    Ok(minted)
}
