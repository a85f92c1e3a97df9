//! Integration tests for the order expiry monitor.
//!
//! Require a PostgreSQL database via DATABASE_URL; skipped otherwise.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use recharge_settlement::domain::NewOrder;
use recharge_settlement::monitor::{close_order, expire_due_orders, OrderExpiryMonitor};
use recharge_settlement::store::OrderStore;

/// Insert a pending order directly, optionally with an expiry deadline.
async fn seed_order(pool: &PgPool, account_id: Uuid, overdue: bool) -> Uuid {
    let store = OrderStore::new(pool.clone());

    let mut new_order = NewOrder::new(
        account_id,
        "phone_recharge".to_string(),
        "13800000000".to_string(),
        dec!(50),
        dec!(50),
    );
    if overdue {
        new_order = new_order.with_expires_at(Utc::now() - ChronoDuration::hours(1));
    }

    let mut tx = pool.begin().await.unwrap();
    let order = store.insert(&mut tx, &new_order).await.unwrap();
    tx.commit().await.unwrap();

    order.id
}

async fn order_status(pool: &PgPool, order_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn sweep_expires_overdue_pending_orders_once() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else {
        return;
    };

    let (account_id, _user_id) = common::seed_account(&pool, dec!(100)).await;
    let order_id = seed_order(&pool, account_id, true).await;

    assert_eq!(expire_due_orders(&pool).await.unwrap(), 1);
    assert_eq!(order_status(&pool, order_id).await, "expired");

    // Re-running is a no-op: the terminal state is excluded by the predicate
    assert_eq!(expire_due_orders(&pool).await.unwrap(), 0);
    assert_eq!(order_status(&pool, order_id).await, "expired");

    // Expiry never touches the balance
    assert_eq!(common::account_balance(&pool, account_id).await, dec!(100));
}

#[tokio::test]
async fn sweep_ignores_orders_without_deadline() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else {
        return;
    };

    let (account_id, _user_id) = common::seed_account(&pool, dec!(100)).await;
    let order_id = seed_order(&pool, account_id, false).await;

    assert_eq!(expire_due_orders(&pool).await.unwrap(), 0);
    assert_eq!(order_status(&pool, order_id).await, "pending");
}

#[tokio::test]
async fn concurrent_sweeps_expire_exactly_once() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else {
        return;
    };

    let (account_id, _user_id) = common::seed_account(&pool, dec!(100)).await;
    seed_order(&pool, account_id, true).await;

    let (a, b) = tokio::join!(expire_due_orders(&pool), expire_due_orders(&pool));
    assert_eq!(a.unwrap() + b.unwrap(), 1);
}

#[tokio::test]
async fn close_order_cancels_pending_only() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else {
        return;
    };

    let (account_id, _user_id) = common::seed_account(&pool, dec!(100)).await;
    let order_id = seed_order(&pool, account_id, false).await;

    assert!(close_order(&pool, order_id, "user cancelled").await.unwrap());
    assert_eq!(order_status(&pool, order_id).await, "cancelled");

    // Already cancelled: no further transition
    assert!(!close_order(&pool, order_id, "again").await.unwrap());

    // Unknown order
    assert!(!close_order(&pool, Uuid::new_v4(), "missing").await.unwrap());
}

#[tokio::test]
async fn monitor_start_stop_is_idempotent_and_sweeps() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else {
        return;
    };

    let (account_id, _user_id) = common::seed_account(&pool, dec!(100)).await;
    let order_id = seed_order(&pool, account_id, true).await;

    let monitor = OrderExpiryMonitor::new(pool.clone(), Duration::from_millis(50));
    monitor.start();
    assert!(monitor.is_running());

    // Second start is a no-op
    monitor.start();
    assert!(monitor.is_running());

    // First sweep runs immediately on start
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(order_status(&pool, order_id).await, "expired");

    monitor.stop();
    assert!(!monitor.is_running());

    // Second stop is a no-op
    monitor.stop();
}
