//! Draw down pool liquidity

use crate::custody::{Custody, CustodyError};
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::Pool;
use pool_model::transitions;

/// Process loan instruction
///
/// Caller must be an authorized borrower. Reserve is untouched: the lent
/// value is still pool equity, held by the borrower. A loan above the
/// accounted custody is refused as a `TransferFailure` before anything moves;
/// if the custody adapter refuses the transfer the loan is rolled back.
pub fn process_loan<C: Custody>(
    pool: &mut Pool<C>,
    caller: &Principal,
    amount: u128,
) -> Result<(), VaultError> {
    pool.borrowers.authorize(caller)?;

    let available = pool.available_liquidity();
    let staged = transitions::loan(&pool.state, caller, amount, available).map_err(|e| match e {
        pool_model::ModelError::InsufficientLiquidity { owed, available } => {
            VaultError::TransferFailure(CustodyError::InsufficientBalance {
                holder: *pool.asset().custodian(),
                available,
                requested: owed,
            })
        }
        other => other.into(),
    })?;
    pool.commit(caller, staged)?;

    log::info!(
        "Loan: {} borrowed {} (outstanding {}, total loan {}, custody {})",
        caller,
        amount,
        pool.outstanding_loan(caller),
        pool.total_loan(),
        pool.custody()
    );
    Ok(())
}
