//! Transaction ledger
//!
//! Append-only store of balance-affecting records. Appends run inside the
//! caller's transaction so a debit and its record commit (or roll back)
//! together.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{NewTransactionRecord, TransactionRecord};

/// Repository for ledger records.
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    pool: PgPool,
}

impl TransactionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a record inside the caller's transaction and return its id.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &NewTransactionRecord,
    ) -> Result<Uuid, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO transaction_records (
                id, account_id, amount, tx_type,
                balance_before, balance_after, status, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.account_id())
        .bind(record.amount())
        .bind(record.tx_type().as_str())
        .bind(record.balance_before())
        .bind(record.balance_after())
        .bind(record.status().as_str())
        .bind(record.description())
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// List records for an account, newest first.
    pub async fn list_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, account_id, amount, tx_type, balance_before,
                   balance_after, status, description, created_at
            FROM transaction_records
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
}
