//! Account store
//!
//! Reads account rows and performs the compare-and-swap balance debit. The
//! balance column is only ever mutated through this store; the conditional
//! update is the single primitive every debit path goes through.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use chrono::{DateTime, Utc};

/// A stored-value account row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub frozen_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for account rows.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: PgPool,
}

impl AccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<AccountRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, user_id, balance, frozen_balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fetch the account owned by a user.
    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Option<AccountRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, user_id, balance, frozen_balance, created_at, updated_at
            FROM accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Compare-and-swap debit: subtract `amount` only if the balance still
    /// equals `expected` (the value read during the sufficiency check).
    ///
    /// Returns `Ok(false)` when zero rows were affected, i.e. a concurrent
    /// settlement moved the balance first and this debit lost the race.
    pub async fn debit_if_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        expected: Decimal,
        amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - $3, updated_at = NOW()
            WHERE id = $1 AND balance = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(amount)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }
}
