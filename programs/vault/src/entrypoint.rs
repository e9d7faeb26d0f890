//! Pool operation surface
//!
//! Holder-facing: `deposit`, `withdraw`, `request_withdraw`.
//! Borrower-facing: `loan`, `repay`.
//! Owner-facing: `set_authorized_borrower`, `transfer_ownership`.

use crate::custody::Custody;
use crate::error::VaultError;
use crate::instructions::*;
use crate::principal::Principal;
use crate::state::{HolderView, Pool, PoolSnapshot};
use pool_model::Settlement;

impl<C: Custody> Pool<C> {
    /// Deposit `amount` of asset; returns shares minted
    pub fn deposit(&mut self, caller: &Principal, amount: u128) -> Result<u128, VaultError> {
        log::debug!("Instruction: Deposit");
        process_deposit(self, caller, amount)
    }

    /// Burn `shares`; returns asset paid out
    pub fn withdraw(&mut self, caller: &Principal, shares: u128) -> Result<u128, VaultError> {
        log::debug!("Instruction: Withdraw");
        process_withdraw(self, caller, shares)
    }

    /// Register demand for `shares`; returns the caller's pending total
    pub fn request_withdraw(&mut self, caller: &Principal, shares: u128) -> Result<u128, VaultError> {
        log::debug!("Instruction: RequestWithdraw");
        process_request_withdraw(self, caller, shares)
    }

    pub fn loan(&mut self, caller: &Principal, amount: u128) -> Result<(), VaultError> {
        log::debug!("Instruction: Loan");
        process_loan(self, caller, amount)
    }

    pub fn repay(&mut self, caller: &Principal, principal: u128, returned: u128) -> Result<Settlement, VaultError> {
        log::debug!("Instruction: Repay");
        process_repay(self, caller, principal, returned)
    }

    pub fn set_authorized_borrower(
        &mut self,
        caller: &Principal,
        borrower: Principal,
        enabled: bool,
    ) -> Result<bool, VaultError> {
        log::debug!("Instruction: SetAuthorizedBorrower");
        process_set_authorized_borrower(self, caller, borrower, enabled)
    }

    pub fn transfer_ownership(&mut self, caller: &Principal, new_owner: Principal) -> Result<(), VaultError> {
        log::debug!("Instruction: TransferOwnership");
        process_transfer_ownership(self, caller, new_owner)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot::capture(self)
    }

    pub fn holder(&self, holder: &Principal) -> HolderView {
        HolderView::capture(self, holder)
    }
}
