//! Owner-only administration

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::Pool;

/// Enable or disable `borrower` for loan/repay.
///
/// # Returns
/// Whether membership changed
pub fn process_set_authorized_borrower<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    borrower: Principal,
    enabled: bool,
) -> Result<bool, VaultError> {
    pool.require_owner(caller)?;

    let changed = pool.borrowers.set(borrower, enabled);
    if changed {
        log::info!(
            "Borrower {} {} ({} authorized)",
            borrower,
            if enabled { "authorized" } else { "revoked" },
            pool.borrowers.len()
        );
    }
    Ok(changed)
}

/// Hand the owner role to `new_owner`
pub fn process_transfer_ownership<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    new_owner: Principal,
) -> Result<(), VaultError> {
    pool.require_owner(caller)?;

    log::info!("Ownership transferred from {} to {}", pool.owner, new_owner);
    pool.owner = new_owner;
    Ok(())
}
