//! Withdrawal store
//!
//! Withdrawal request rows and payout account lookups. Payout accounts are
//! read-only here; registration lives with the out-of-scope profile layer.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{PaymentAccount, WithdrawalRequest, WithdrawalStatus};

/// Repository for withdrawal requests and payout accounts.
#[derive(Debug, Clone)]
pub struct WithdrawalStore {
    pool: PgPool,
}

impl WithdrawalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new withdrawal request in `pending` status with a zero fee,
    /// inside the caller's transaction.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        amount: Decimal,
        payout_account_id: Uuid,
    ) -> Result<WithdrawalRequest, sqlx::Error> {
        sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            INSERT INTO withdrawal_requests (id, account_id, amount, payout_account_id, fee, status)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING id, account_id, amount, payout_account_id, fee, status,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(amount)
        .bind(payout_account_id)
        .bind(WithdrawalStatus::Pending.as_str())
        .fetch_one(&mut **tx)
        .await
    }

    /// Fetch a withdrawal request by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<WithdrawalRequest>, sqlx::Error> {
        sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            SELECT id, account_id, amount, payout_account_id, fee, status,
                   created_at, updated_at
            FROM withdrawal_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fetch a registered payout account by id.
    pub async fn get_payment_account(
        &self,
        id: Uuid,
    ) -> Result<Option<PaymentAccount>, sqlx::Error> {
        sqlx::query_as::<_, PaymentAccount>(
            r#"
            SELECT id, user_id, account_type, account_no, holder_name, created_at
            FROM payment_accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
