//! Order Expiry Monitor
//!
//! Polling reconciliation loop that moves orders left in `pending` past
//! their expiry deadline into the terminal `expired` state. Expiry never
//! touches balances: the debit already happened at order creation, expiry
//! only records that fulfillment did not happen in time.

use sqlx::PgPool;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use uuid::Uuid;

/// Monitor errors
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Expire all pending orders whose deadline has passed.
///
/// Idempotent and re-entrant-safe: the `status = 'pending'` predicate makes
/// re-runs a no-op, and concurrent sweeps racing on the same row are safe
/// because the transition is one-way terminal. Orders without a deadline are
/// never auto-expired.
pub async fn expire_due_orders(pool: &PgPool) -> Result<u64, MonitorError> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE orders
        SET status = 'expired',
            remark = 'expired by reconciliation sweep',
            updated_at = NOW()
        WHERE status = 'pending'
          AND expires_at IS NOT NULL
          AND expires_at < NOW()
        "#,
    )
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected > 0 {
        tracing::info!(rows_affected, "Expired overdue pending orders");
    }

    Ok(rows_affected)
}

/// Manually close a pending order, independent of the timer.
///
/// Returns `false` when the order does not exist or is no longer pending.
pub async fn close_order(pool: &PgPool, order_id: Uuid, reason: &str) -> Result<bool, MonitorError> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE orders
        SET status = 'cancelled', remark = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(order_id)
    .bind(reason)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 1 {
        tracing::info!(%order_id, reason, "Order closed manually");
    }

    Ok(rows_affected == 1)
}

/// Singleton polling loop sweeping the order table.
pub struct OrderExpiryMonitor {
    pool: PgPool,
    sweep_interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl OrderExpiryMonitor {
    pub fn new(pool: PgPool, sweep_interval: Duration) -> Self {
        Self {
            pool,
            sweep_interval,
            handle: Mutex::new(None),
        }
    }

    /// Start the sweep loop. The first sweep runs immediately, then one per
    /// interval. Starting an already-running monitor is a logged no-op.
    pub fn start(&self) {
        let mut handle = self.handle.lock().expect("monitor handle lock poisoned");

        if let Some(existing) = handle.as_ref() {
            if !existing.is_finished() {
                tracing::info!("Order expiry monitor already running, start is a no-op");
                return;
            }
        }

        let pool = self.pool.clone();
        let sweep_interval = self.sweep_interval;

        *handle = Some(tokio::spawn(async move {
            tracing::info!(?sweep_interval, "Order expiry monitor started");
            let mut ticker = interval(sweep_interval);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                if let Err(e) = expire_due_orders(&pool).await {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            }
        }));
    }

    /// Stop the sweep loop. Stopping a stopped monitor is a logged no-op.
    pub fn stop(&self) {
        let mut handle = self.handle.lock().expect("monitor handle lock poisoned");

        match handle.take() {
            Some(task) => {
                task.abort();
                tracing::info!("Order expiry monitor stopped");
            }
            None => {
                tracing::info!("Order expiry monitor not running, stop is a no-op");
            }
        }
    }

    /// Whether the sweep loop is currently running.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .expect("monitor handle lock poisoned")
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_error_display() {
        let err = MonitorError::Database(sqlx::Error::RowNotFound);
        assert!(err.to_string().contains("Database error"));
    }
}
