//! State machine fuzzing for the pool ledger
//!
//! Increase cases: PROPTEST_CASES=1000 cargo test -p liquidity-vault-integration-tests
//!
//! - Snapshot-based "no mutation on error" checking
//! - Postconditions for every accepted operation
//! - Global invariants (custody, ledger sums, repayable loans) after each step
//! - Prefunded repayments interleaved with every other operation

use liquidity_vault::*;
use liquidity_vault_integration_tests::assert_balanced;
use proptest::prelude::*;

// ============================================================================
// ACTORS AND SNAPSHOTS
// ============================================================================

const HOLDERS: usize = 3;
const BORROWERS: usize = 2;

struct World {
    mode: RepayMode,
    pool: Pool<MemoryCustody>,
    holders: [Principal; HOLDERS],
    /// Index 0 is authorized, index 1 never is
    borrowers: [Principal; BORROWERS],
}

/// Everything observable about the pool and the asset ledger
#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    pool: PoolSnapshot,
    balances: Vec<u128>,
}

impl World {
    fn new(mode: RepayMode) -> Self {
        let holders = [Principal::new_unique(), Principal::new_unique(), Principal::new_unique()];
        let borrowers = [Principal::new_unique(), Principal::new_unique()];
        let owner = Principal::new_unique();

        let seed = holders
            .iter()
            .map(|h| (*h, 100_000u128))
            .chain(borrowers.iter().map(|b| (*b, 50_000u128)));
        let custody = MemoryCustody::with_balances(Principal::new_unique(), seed).unwrap();
        let params = PoolParams { repay_mode: mode, ..PoolParams::default() };
        let mut pool = Pool::with_params(custody, owner, params);
        pool.set_authorized_borrower(&owner, borrowers[0], true).unwrap();

        World { mode, pool, holders, borrowers }
    }

    fn take(&self) -> Snapshot {
        let balances = self
            .holders
            .iter()
            .chain(self.borrowers.iter())
            .map(|p| self.pool.asset().balance_of(p))
            .collect();
        Snapshot { pool: self.pool.snapshot(), balances }
    }

    fn check_invariants(&self, context: &str) {
        let pool = &self.pool;
        assert!(
            pool.reserve() >= pool.total_loan(),
            "{}: reserve {} fell below total loan {}",
            context,
            pool.reserve(),
            pool.total_loan()
        );
        match self.mode {
            RepayMode::Pull => assert_balanced(pool),
            // Unbooked prefunds sit on top of the accounted balance
            RepayMode::Prefunded => {
                assert!(
                    pool.custody() >= pool.reserve() - pool.total_loan(),
                    "{}: custody {} below reserve {} - total loan {}",
                    context,
                    pool.custody(),
                    pool.reserve(),
                    pool.total_loan()
                );
                assert!(pool_model::ledger_consistent(pool.state()), "{}: ledger sums disagree", context);
            }
        }
        for holder in &self.holders {
            if pool.balance_of(holder) == 0 {
                assert_eq!(pool.pending_withdraw_request(holder), 0, "{}: demand outlived shares", context);
            }
        }
    }

    /// Unaccounted custody a prefunded repay can book
    fn surplus(&self) -> u128 {
        self.pool.custody() - (self.pool.reserve() - self.pool.total_loan())
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum Action {
    Deposit { who: usize, amount: u128 },
    /// Burn `pct` percent of the holder's shares (above 100 is invalid)
    Withdraw { who: usize, pct: u128 },
    RequestWithdraw { who: usize, pct: u128 },
    Loan { who: usize, amount: u128 },
    /// Repay `pct` percent of the outstanding loan, returning `bps` of it
    Repay { who: usize, pct: u128, bps: u128 },
    /// The authorized borrower sends funds to custody ahead of `repay`
    Prefund { amount: u128 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        10 => (0..HOLDERS, 0u128..20_000).prop_map(|(who, amount)| Action::Deposit { who, amount }),
        6 => (0..HOLDERS, 0u128..=110).prop_map(|(who, pct)| Action::Withdraw { who, pct }),
        4 => (0..HOLDERS, 0u128..=110).prop_map(|(who, pct)| Action::RequestWithdraw { who, pct }),
        5 => (0..BORROWERS, 0u128..30_000).prop_map(|(who, amount)| Action::Loan { who, amount }),
        5 => (0..BORROWERS, 0u128..=110, 5_000u128..15_000)
            .prop_map(|(who, pct, bps)| Action::Repay { who, pct, bps }),
    ]
}

fn prefunded_action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => action_strategy(),
        1 => (0u128..30_000).prop_map(|amount| Action::Prefund { amount }),
    ]
}

fn assert_unchanged(world: &World, before: &Snapshot, context: &str) {
    assert_eq!(&world.take(), before, "{}: rejected operation mutated state", context);
}

// ============================================================================
// STATE MACHINE
// ============================================================================

fn execute(world: &mut World, action: &Action, step: usize) {
    let context = format!("Step {} ({:?})", step, action);
    let before = world.take();
    let p = &before.pool;

    match *action {
        Action::Deposit { who, amount } => {
            let holder = world.holders[who];
            match world.pool.deposit(&holder, amount) {
                Ok(minted) => {
                    assert!(minted > 0, "{}: zero mint accepted", context);
                    assert_eq!(world.pool.total_supply(), p.total_supply + minted, "{}", context);
                    assert_eq!(world.pool.reserve(), p.reserve + amount, "{}", context);
                    assert_eq!(
                        world.pool.asset().balance_of(&holder),
                        before.balances[who] - amount,
                        "{}",
                        context
                    );
                }
                Err(_) => assert_unchanged(world, &before, &context),
            }
        }

        Action::Withdraw { who, pct } => {
            let holder = world.holders[who];
            let shares = world.pool.balance_of(&holder) * pct / 100;
            let pending_before = world.pool.pending_withdraw_request(&holder);
            match world.pool.withdraw(&holder, shares) {
                Ok(owed) => {
                    assert!(owed <= p.available_liquidity, "{}: paid out unbooked custody", context);
                    let pending = world.pool.pending_withdraw_request(&holder);
                    if world.pool.balance_of(&holder) == 0 {
                        assert_eq!(pending, 0, "{}", context);
                    } else {
                        assert_eq!(pending, pending_before - pending_before.min(shares), "{}", context);
                    }
                    assert_eq!(world.pool.total_supply(), p.total_supply - shares, "{}", context);
                    assert_eq!(world.pool.reserve(), p.reserve - owed, "{}", context);
                    assert_eq!(
                        world.pool.asset().balance_of(&holder),
                        before.balances[who] + owed,
                        "{}",
                        context
                    );
                }
                Err(VaultError::InsufficientLiquidity { owed, available }) => {
                    assert!(owed > available, "{}", context);
                    assert_unchanged(world, &before, &context);
                }
                Err(_) => assert_unchanged(world, &before, &context),
            }
        }

        Action::RequestWithdraw { who, pct } => {
            let holder = world.holders[who];
            let shares = world.pool.balance_of(&holder) * pct / 100;
            let pending_before = world.pool.pending_withdraw_request(&holder);
            match world.pool.request_withdraw(&holder, shares) {
                Ok(pending) => {
                    assert_eq!(pending, pending_before + shares, "{}", context);
                    assert_eq!(
                        world.pool.total_request_withdraw(),
                        p.total_request_withdraw + shares,
                        "{}",
                        context
                    );
                    assert_eq!(world.pool.reserve(), p.reserve, "{}", context);
                    assert_eq!(world.pool.custody(), p.custody, "{}", context);
                }
                Err(_) => assert_unchanged(world, &before, &context),
            }
        }

        Action::Loan { who, amount } => {
            let borrower = world.borrowers[who];
            match world.pool.loan(&borrower, amount) {
                Ok(()) => {
                    assert_eq!(who, 0, "{}: unauthorized borrower drew a loan", context);
                    assert!(amount <= p.available_liquidity, "{}: lent unbooked custody", context);
                    assert_eq!(world.pool.total_loan(), p.total_loan + amount, "{}", context);
                    assert_eq!(world.pool.reserve(), p.reserve, "{}", context);
                }
                Err(_) => assert_unchanged(world, &before, &context),
            }
        }

        Action::Repay { who, pct, bps } => {
            let borrower = world.borrowers[who];
            let principal = world.pool.outstanding_loan(&borrower) * pct / 100;
            let returned = principal * bps / 10_000;
            let surplus_before = world.surplus();
            match world.pool.repay(&borrower, principal, returned) {
                Ok(_) => {
                    assert_eq!(who, 0, "{}: unauthorized borrower repaid", context);
                    assert_eq!(world.pool.total_loan(), p.total_loan - principal, "{}", context);
                    assert_eq!(world.pool.reserve(), p.reserve + returned - principal, "{}", context);
                    let paid_from = HOLDERS + who;
                    match world.mode {
                        RepayMode::Pull => assert_eq!(
                            world.pool.asset().balance_of(&borrower),
                            before.balances[paid_from] - returned,
                            "{}",
                            context
                        ),
                        RepayMode::Prefunded => {
                            assert_eq!(world.surplus(), surplus_before - returned, "{}", context);
                            assert_eq!(
                                world.pool.asset().balance_of(&borrower),
                                before.balances[paid_from],
                                "{}",
                                context
                            );
                        }
                    }
                }
                Err(_) => assert_unchanged(world, &before, &context),
            }
        }

        Action::Prefund { amount } => {
            let borrower = world.borrowers[0];
            let custodian = *world.pool.asset().custodian();
            let amount = amount.min(world.pool.asset().balance_of(&borrower));
            world.pool.asset_mut().transfer(&borrower, &custodian, amount).unwrap();
            assert_eq!(world.pool.custody(), p.custody + amount, "{}", context);
            assert_eq!(world.pool.reserve(), p.reserve, "{}", context);
            // Nothing booked yet, so nothing new to spend
            assert_eq!(world.pool.available_liquidity(), p.available_liquidity, "{}", context);
        }
    }

    world.check_invariants(&context);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fuzz_pool_state_machine(
        actions in prop::collection::vec(action_strategy(), 20..80)
    ) {
        let mut world = World::new(RepayMode::Pull);
        for (step, action) in actions.iter().enumerate() {
            execute(&mut world, action, step);
        }
    }

    #[test]
    fn fuzz_prefunded_state_machine(
        actions in prop::collection::vec(prefunded_action_strategy(), 20..80)
    ) {
        let mut world = World::new(RepayMode::Prefunded);
        for (step, action) in actions.iter().enumerate() {
            execute(&mut world, action, step);
        }

        // Every outstanding loan can still be settled, and then everyone can leave
        let borrower = world.borrowers[0];
        let outstanding = world.pool.outstanding_loan(&borrower);
        if outstanding > 0 {
            let custodian = *world.pool.asset().custodian();
            world.pool.asset_mut().mint(&borrower, outstanding).unwrap();
            world.pool.asset_mut().transfer(&borrower, &custodian, outstanding).unwrap();
            prop_assert_eq!(world.pool.repay(&borrower, outstanding, outstanding), Ok(Settlement::Even));
        }
        for holder in world.holders {
            let shares = world.pool.balance_of(&holder);
            if shares > 0 {
                world.pool.withdraw(&holder, shares).unwrap();
            }
        }

        prop_assert_eq!(world.pool.total_supply(), 0);
        prop_assert_eq!(world.pool.total_loan(), 0);
        prop_assert_eq!(world.pool.reserve(), 0);
        world.check_invariants("after exit");
    }

    #[test]
    fn fuzz_full_exit_after_settlement(
        actions in prop::collection::vec(action_strategy(), 20..60)
    ) {
        let mut world = World::new(RepayMode::Pull);
        for (step, action) in actions.iter().enumerate() {
            execute(&mut world, action, step);
        }

        // Settle every loan at par, then everyone can leave
        let borrower = world.borrowers[0];
        let outstanding = world.pool.outstanding_loan(&borrower);
        if outstanding > 0 {
            world.pool.asset_mut().mint(&borrower, outstanding).unwrap();
            world.pool.repay(&borrower, outstanding, outstanding).unwrap();
        }
        for holder in world.holders {
            let shares = world.pool.balance_of(&holder);
            if shares > 0 {
                world.pool.withdraw(&holder, shares).unwrap();
            }
        }

        prop_assert_eq!(world.pool.total_supply(), 0);
        prop_assert_eq!(world.pool.total_request_withdraw(), 0);
        prop_assert_eq!(world.pool.total_loan(), 0);
        // The last holder out takes whatever rounding left behind
        prop_assert_eq!(world.pool.reserve(), 0);
        prop_assert_eq!(world.pool.custody(), 0);
        assert_balanced(&world.pool);
    }

    #[test]
    fn fuzz_prefunded_repay_never_books_unfunded_returns(
        deposit in 1u128..100_000,
        lent_pct in 1u128..=100,
        prefund in 0u128..100_000,
        returned in 0u128..100_000,
    ) {
        let mut world = World::new(RepayMode::Prefunded);
        let holder = world.holders[0];
        let borrower = world.borrowers[0];
        world.pool.deposit(&holder, deposit).unwrap();

        let principal = deposit * lent_pct / 100;
        prop_assume!(principal > 0);
        world.pool.loan(&borrower, principal).unwrap();

        let custodian = *world.pool.asset().custodian();
        let prefund = prefund.min(world.pool.asset().balance_of(&borrower));
        world.pool.asset_mut().transfer(&borrower, &custodian, prefund).unwrap();
        let before = world.take();

        match world.pool.repay(&borrower, principal, returned) {
            Ok(_) => {
                prop_assert!(returned <= prefund);
                prop_assert!(world.pool.custody() >= world.pool.reserve() - world.pool.total_loan());
            }
            Err(VaultError::RepayNotFunded { returned: r, surplus }) => {
                prop_assert_eq!(r, returned);
                prop_assert_eq!(surplus, prefund);
                prop_assert!(returned > prefund);
                prop_assert_eq!(world.take(), before);
            }
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
    }
}
