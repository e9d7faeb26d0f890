//! Vault error taxonomy
//!
//! Every error is a whole-operation abort: by the time one is returned the
//! ledger is exactly as it was before the call.

use crate::custody::CustodyError;
use crate::principal::Principal;
use pool_model::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("invalid amount")]
    InvalidAmount,
    #[error("{0} is not authorized for this operation")]
    Unauthorized(Principal),
    #[error("insufficient liquidity: owed {owed}, custody holds {available}")]
    InsufficientLiquidity { owed: u128, available: u128 },
    #[error("pool can pay this withdrawal now, use withdraw")]
    UseDirectWithdraw,
    #[error("custody transfer failed: {0}")]
    TransferFailure(#[from] CustodyError),
    #[error("repayment of {returned} not funded, unaccounted custody is {surplus}")]
    RepayNotFunded { returned: u128, surplus: u128 },
    #[error("pool has outstanding shares but no reserve")]
    Insolvent,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("pool service is not running")]
    ServiceUnavailable,
}

impl From<ModelError> for VaultError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidAmount => VaultError::InvalidAmount,
            ModelError::InsufficientLiquidity { owed, available } => {
                VaultError::InsufficientLiquidity { owed, available }
            }
            ModelError::UseDirectWithdraw => VaultError::UseDirectWithdraw,
            ModelError::Insolvent => VaultError::Insolvent,
            ModelError::Overflow => VaultError::Overflow,
        }
    }
}
