//! Return borrowed liquidity with the trading result

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::{Pool, RepayMode};
use pool_model::{transitions, Movement, Settlement};

/// Process repay instruction
///
/// Closes `principal` of the caller's outstanding loan with `returned` of
/// asset: `total_loan -= principal`, `reserve += returned - principal`. A
/// shortfall is absorbed by every shareholder through a lower NAV per share.
///
/// In `RepayMode::Pull` the returned asset is pulled from the caller here.
/// In `RepayMode::Prefunded` it must already sit in custody on top of
/// `reserve - total_loan`.
pub fn process_repay<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    principal: u128,
    returned: u128,
) -> Result<Settlement, VaultError> {
    pool.borrowers.authorize(caller)?;

    let mut staged = transitions::repay(&pool.state, caller, principal, returned)?;

    if pool.params.repay_mode == RepayMode::Prefunded {
        let surplus = pool.custody().saturating_sub(pool.state.expected_custody());
        if surplus < returned {
            log::warn!(
                "Repay: {} claims {} returned but only {} is unaccounted in custody",
                caller,
                returned,
                surplus
            );
            return Err(VaultError::RepayNotFunded { returned, surplus });
        }
        staged.movement = Movement::None;
    }

    let settlement = pool.commit(caller, staged)?;

    match settlement {
        Settlement::Loss(loss) => log::warn!(
            "Repay: {} returned {} for {} principal, loss of {} socialized (reserve {})",
            caller,
            returned,
            principal,
            loss,
            pool.reserve()
        ),
        _ => log::info!(
            "Repay: {} returned {} for {} principal, {:?} (reserve {})",
            caller,
            returned,
            principal,
            settlement,
            pool.reserve()
        ),
    }
    Ok(settlement)
}
