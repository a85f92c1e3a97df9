//! Order store
//!
//! Insert, fetch and delete order rows. The delete is the compensation
//! primitive for stores without multi-statement transactions; the settlement
//! service itself composes insert + debit + ledger append in one transaction
//! and relies on rollback instead.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderStatus};

/// Repository for order rows.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pool: PgPool,
}

impl OrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order in `pending` status inside the caller's
    /// transaction. The unique index on `order_no` backs the global
    /// uniqueness of order numbers.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_order: &NewOrder,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, order_no, account_id, business_type, target_account,
                amount, actual_amount, status, expires_at, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, order_no, account_id, business_type, target_account,
                      amount, actual_amount, status, expires_at, metadata,
                      remark, created_at, updated_at
            "#,
        )
        .bind(new_order.id)
        .bind(&new_order.order_no)
        .bind(new_order.account_id)
        .bind(&new_order.business_type)
        .bind(&new_order.target_account)
        .bind(new_order.amount)
        .bind(new_order.actual_amount)
        .bind(OrderStatus::Pending.as_str())
        .bind(new_order.expires_at)
        .bind(&new_order.metadata)
        .fetch_one(&mut **tx)
        .await
    }

    /// Fetch an order by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_no, account_id, business_type, target_account,
                   amount, actual_amount, status, expires_at, metadata,
                   remark, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List orders for an account, newest first.
    pub async fn list_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_no, account_id, business_type, target_account,
                   amount, actual_amount, status, expires_at, metadata,
                   remark, created_at, updated_at
            FROM orders
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete an order row (compensation primitive for non-transactional
    /// stores).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let rows_affected = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
