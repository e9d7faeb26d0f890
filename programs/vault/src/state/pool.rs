//! Pool ledger state

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::gateway::BorrowerSet;
use pool_model::{Movement, PoolState, Staged};
use serde::{Deserialize, Serialize};

/// Fee parameter of the same-transaction borrow feature, exposed read-only
pub const DEFAULT_FLASH_FEE_RATE: u64 = 1;

/// How `repay` obtains the returned asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepayMode {
    /// Pull the returned amount from the borrower inside `repay`
    #[default]
    Pull,
    /// Borrower sends funds to the pool beforehand; `repay` checks the
    /// unaccounted custody covers the returned amount
    Prefunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolParams {
    pub flash_fee_rate: u64,
    pub repay_mode: RepayMode,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            flash_fee_rate: DEFAULT_FLASH_FEE_RATE,
            repay_mode: RepayMode::Pull,
        }
    }
}

/// Pooled-liquidity vault.
///
/// Owns the share ledger and the custody adapter. Every mutating operation
/// takes `&mut self`, so nothing (including a custody callback) can observe
/// or re-enter the pool while an operation is in flight.
pub struct Pool<C: Custody> {
    pub(crate) asset: C,
    pub(crate) owner: Principal,
    pub(crate) state: PoolState<Principal>,
    pub(crate) borrowers: BorrowerSet,
    pub(crate) params: PoolParams,
}

impl<C: Custody> Pool<C> {
    pub fn new(asset: C, owner: Principal) -> Self {
        Self::with_params(asset, owner, PoolParams::default())
    }

    pub fn with_params(asset: C, owner: Principal, params: PoolParams) -> Self {
        log::info!(
            "Pool created: custodian {}, owner {}, repay mode {:?}",
            asset.custodian(),
            owner,
            params.repay_mode
        );
        Self {
            asset,
            owner,
            state: PoolState::new(),
            borrowers: BorrowerSet::new(),
            params,
        }
    }

    /// Apply staged writes, then move the asset.
    ///
    /// Accounting is updated before custody is called. If custody refuses,
    /// the writes are undone and the custody error is returned.
    pub(crate) fn commit<R>(&mut self, counterparty: &Principal, staged: Staged<Principal, R>) -> Result<R, VaultError> {
        let undo = self.state.apply(staged.effects);

        let moved = match staged.movement {
            Movement::None | Movement::In(0) | Movement::Out(0) => Ok(()),
            Movement::In(amount) => self.asset.transfer_in(counterparty, amount),
            Movement::Out(amount) => self.asset.transfer_out(counterparty, amount),
        };

        if let Err(e) = moved {
            self.state.apply(undo);
            log::warn!("Custody refused movement for {}: {}", counterparty, e);
            return Err(e.into());
        }

        Ok(staged.outcome)
    }

    pub(crate) fn require_owner(&self, caller: &Principal) -> Result<(), VaultError> {
        if caller != &self.owner {
            log::warn!("Rejected owner call from {}", caller);
            return Err(VaultError::Unauthorized(*caller));
        }
        Ok(())
    }

    // Read-only introspection

    pub fn reserve(&self) -> u128 {
        self.state.totals.reserve
    }

    pub fn total_loan(&self) -> u128 {
        self.state.totals.total_loan
    }

    /// Total outstanding shares
    pub fn total_supply(&self) -> u128 {
        self.state.totals.total_shares
    }

    pub fn total_request_withdraw(&self) -> u128 {
        self.state.totals.total_request_withdraw
    }

    /// Share balance of `holder`
    pub fn balance_of(&self, holder: &Principal) -> u128 {
        self.state.shares_of(holder)
    }

    pub fn pending_withdraw_request(&self, holder: &Principal) -> u128 {
        self.state.pending_of(holder)
    }

    pub fn outstanding_loan(&self, borrower: &Principal) -> u128 {
        self.state.loan_of(borrower)
    }

    pub fn flash_fee_rate(&self) -> u64 {
        self.params.flash_fee_rate
    }

    pub fn repay_mode(&self) -> RepayMode {
        self.params.repay_mode
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn is_authorized_borrower(&self, principal: &Principal) -> bool {
        self.borrowers.contains(principal)
    }

    pub fn borrowers(&self) -> &BorrowerSet {
        &self.borrowers
    }

    /// Physical asset balance held by the pool
    pub fn custody(&self) -> u128 {
        self.asset.custody()
    }

    /// Custody the pool may pay out or lend: the physical balance capped at
    /// `reserve - total_loan`, so prefunded repayments stay untouched until
    /// `repay` books them
    pub fn available_liquidity(&self) -> u128 {
        self.custody().min(self.state.expected_custody())
    }

    pub fn state(&self) -> &PoolState<Principal> {
        &self.state
    }

    pub fn asset(&self) -> &C {
        &self.asset
    }

    /// Direct access to the asset ledger, for moving funds outside the pool's
    /// own operations (e.g. a borrower prefunding a repayment)
    pub fn asset_mut(&mut self) -> &mut C {
        &mut self.asset
    }
}
