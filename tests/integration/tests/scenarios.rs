//! End-to-end pool scenarios driven through the service handle

use liquidity_vault::*;
use liquidity_vault_integration_tests::{assert_balanced, Cast};

#[tokio::test]
async fn test_reference_round_trip() {
    let cast = Cast::new();
    let (pool, task) = cast.spawn(RepayMode::Pull, 1000, 0, 100);

    assert_eq!(pool.deposit(cast.bob, 500).await, Ok(500));
    pool.loan(cast.middle_man, 100).await.unwrap();
    assert_eq!(pool.withdraw(cast.bob, 400).await, Ok(400));

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.custody, 0);
    assert_eq!(snapshot.reserve, 100);
    assert_eq!(snapshot.total_loan, 100);

    assert_eq!(pool.repay(cast.middle_man, 100, 200).await, Ok(Settlement::Gain(100)));
    assert_eq!(pool.withdraw(cast.bob, 100).await, Ok(200));

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.total_supply, 0);
    assert_eq!(snapshot.reserve, 0);
    assert_eq!(snapshot.custody, 0);

    drop(pool);
    let pool = task.await.unwrap();
    assert_balanced(&pool);
    assert_eq!(pool.asset().balance_of(&cast.bob), 1100);
    assert_eq!(pool.asset().balance_of(&cast.middle_man), 0);
}

#[tokio::test]
async fn test_request_then_withdraw_after_repay() {
    let cast = Cast::new();
    let (pool, task) = cast.spawn(RepayMode::Pull, 1000, 1000, 1000);

    pool.deposit(cast.bob, 1000).await.unwrap();
    pool.deposit(cast.carol, 1000).await.unwrap();
    pool.loan(cast.middle_man, 1800).await.unwrap();

    assert_eq!(pool.request_withdraw(cast.bob, 50).await, Err(VaultError::UseDirectWithdraw));
    assert_eq!(pool.request_withdraw(cast.bob, 600).await, Ok(600));
    assert_eq!(pool.request_withdraw(cast.carol, 300).await, Ok(300));

    let view = pool.holder(cast.bob).await.unwrap();
    assert_eq!(view.pending_withdraw_request, 600);
    assert_eq!(view.redeemable, 1000);

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.total_request_withdraw, 900);
    assert_eq!(snapshot.liquidity_shortfall, 700);

    assert_eq!(
        pool.withdraw(cast.bob, 600).await,
        Err(VaultError::InsufficientLiquidity { owed: 600, available: 200 })
    );

    pool.repay(cast.middle_man, 1800, 1800).await.unwrap();
    assert_eq!(pool.withdraw(cast.bob, 600).await, Ok(600));

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.total_request_withdraw, 300);
    assert_eq!(snapshot.pending_requests.len(), 1);
    assert_eq!(snapshot.pending_requests[0].holder, cast.carol);

    drop(pool);
    assert_balanced(&task.await.unwrap());
}

#[tokio::test]
async fn test_losses_reach_every_holder() {
    let cast = Cast::new();
    let (pool, task) = cast.spawn(RepayMode::Pull, 500, 500, 0);

    pool.deposit(cast.bob, 500).await.unwrap();
    pool.deposit(cast.carol, 500).await.unwrap();
    pool.loan(cast.middle_man, 400).await.unwrap();
    assert_eq!(pool.repay(cast.middle_man, 400, 200).await, Ok(Settlement::Loss(200)));

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.nav_per_share_e6, Some(800_000));

    assert_eq!(pool.withdraw(cast.bob, 500).await, Ok(400));
    assert_eq!(pool.withdraw(cast.carol, 500).await, Ok(400));

    drop(pool);
    let pool = task.await.unwrap();
    assert_balanced(&pool);
    assert_eq!(pool.asset().balance_of(&cast.middle_man), 200);
}

#[tokio::test]
async fn test_admin_surface() {
    let cast = Cast::new();
    let (pool, task) = cast.spawn(RepayMode::Pull, 100, 0, 0);
    let new_owner = Principal::new_unique();

    assert_eq!(
        pool.set_authorized_borrower(cast.bob, cast.carol, true).await,
        Err(VaultError::Unauthorized(cast.bob))
    );
    assert_eq!(pool.set_authorized_borrower(cast.owner, cast.carol, true).await, Ok(true));
    pool.transfer_ownership(cast.owner, new_owner).await.unwrap();
    assert_eq!(
        pool.set_authorized_borrower(cast.owner, cast.carol, false).await,
        Err(VaultError::Unauthorized(cast.owner))
    );
    assert_eq!(pool.set_authorized_borrower(new_owner, cast.carol, false).await, Ok(true));

    let snapshot = pool.snapshot().await.unwrap();
    assert_eq!(snapshot.owner, new_owner);
    assert_eq!(snapshot.authorized_borrowers, vec![cast.middle_man]);
    assert_eq!(snapshot.flash_fee_rate, 1);

    drop(pool);
    task.await.unwrap();
}

#[tokio::test]
async fn test_prefunded_repay_through_service() {
    let cast = Cast::new();
    let (pool, task) = cast.spawn(RepayMode::Prefunded, 1000, 0, 0);

    pool.deposit(cast.bob, 1000).await.unwrap();
    pool.loan(cast.middle_man, 500).await.unwrap();
    assert_eq!(
        pool.repay(cast.middle_man, 500, 500).await,
        Err(VaultError::RepayNotFunded { returned: 500, surplus: 0 })
    );

    drop(pool);
    let mut inner = task.await.unwrap();
    let custodian = *inner.asset().custodian();
    inner.asset_mut().transfer(&cast.middle_man, &custodian, 500).unwrap();
    assert_eq!(inner.repay(&cast.middle_man, 500, 500), Ok(Settlement::Even));
    assert_balanced(&inner);
}

#[tokio::test]
async fn test_many_holders_against_one_borrower() {
    let cast = Cast::new();
    let holders: Vec<Principal> = (0..8).map(|_| Principal::new_unique()).collect();
    let custody = MemoryCustody::with_balances(
        cast.custodian,
        holders.iter().map(|h| (*h, 1_000)).chain([(cast.middle_man, 10_000)]),
    )
    .unwrap();
    let mut inner = Pool::new(custody, cast.owner);
    inner.set_authorized_borrower(&cast.owner, cast.middle_man, true).unwrap();
    let (pool, task) = PoolService::spawn(inner, 4);

    let mut joins = Vec::new();
    for holder in holders.clone() {
        let pool = pool.clone();
        joins.push(tokio::spawn(async move { pool.deposit(holder, 1_000).await }));
    }
    for join in joins {
        assert_eq!(join.await.unwrap(), Ok(1_000));
    }

    pool.loan(cast.middle_man, 6_000).await.unwrap();
    pool.repay(cast.middle_man, 6_000, 6_800).await.unwrap();

    // 8_800 reserve over 8_000 shares
    let mut joins = Vec::new();
    for holder in holders.clone() {
        let pool = pool.clone();
        joins.push(tokio::spawn(async move { pool.withdraw(holder, 1_000).await }));
    }
    for join in joins {
        assert_eq!(join.await.unwrap(), Ok(1_100));
    }

    drop(pool);
    let inner = task.await.unwrap();
    assert_balanced(&inner);
    assert_eq!(inner.total_supply(), 0);
    assert_eq!(inner.asset().balance_of(&cast.middle_man), 9_200);
}
