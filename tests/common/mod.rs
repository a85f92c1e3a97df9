//! Common test utilities

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

static DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// All integration tests share one database; hold this across each test so
/// truncates don't interleave.
pub async fn db_lock() -> MutexGuard<'static, ()> {
    DB_LOCK.get_or_init(|| Mutex::new(())).lock().await
}

/// Connect, apply the schema and truncate all tables for a fresh state.
/// Returns `None` (skipping the test) when DATABASE_URL is not set.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping integration test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to apply schema");
    }

    sqlx::query(
        "TRUNCATE TABLE transaction_records, withdrawal_requests, orders, payment_accounts, accounts CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to clean up DB");

    Some(pool)
}

/// Insert an account with the given balance; returns (account_id, user_id).
pub async fn seed_account(pool: &PgPool, balance: Decimal) -> (Uuid, Uuid) {
    let account_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO accounts (id, user_id, balance) VALUES ($1, $2, $3)")
        .bind(account_id)
        .bind(user_id)
        .bind(balance)
        .execute(pool)
        .await
        .expect("Failed to seed account");

    (account_id, user_id)
}

/// Insert a registered payout account for a user.
pub async fn seed_payment_account(pool: &PgPool, user_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO payment_accounts (id, user_id, account_type, account_no, holder_name)
        VALUES ($1, $2, 'bank_card', '6222000011112222', 'Test Holder')
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await
    .expect("Failed to seed payment account");

    id
}

/// Current balance of an account.
pub async fn account_balance(pool: &PgPool, account_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}

/// Row count of a table.
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
