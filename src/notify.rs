//! Balance-changed notifications
//!
//! Fire-and-forget broadcast signal emitted after a settlement commits, so
//! dependent views can refresh without polling. Publishing with no
//! subscribers is not an error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default channel capacity; slow subscribers that lag past this simply
/// miss intermediate updates.
const CHANNEL_CAPACITY: usize = 256;

/// A committed balance change.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceChanged {
    pub account_id: Uuid,
    pub balance: Decimal,
    pub at: DateTime<Utc>,
}

/// Broadcast handle shared by the settlement services.
#[derive(Debug, Clone)]
pub struct BalanceNotifier {
    tx: broadcast::Sender<BalanceChanged>,
}

impl BalanceNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to balance changes.
    pub fn subscribe(&self) -> broadcast::Receiver<BalanceChanged> {
        self.tx.subscribe()
    }

    /// Publish a change. A send error only means there are currently no
    /// subscribers, which is fine for a fire-and-forget signal.
    pub fn publish(&self, account_id: Uuid, balance: Decimal) {
        let event = BalanceChanged {
            account_id,
            balance,
            at: Utc::now(),
        };

        if self.tx.send(event).is_err() {
            tracing::debug!(%account_id, "No balance-change subscribers");
        }
    }
}

impl Default for BalanceNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let notifier = BalanceNotifier::new();
        let mut rx = notifier.subscribe();
        let account_id = Uuid::new_v4();

        notifier.publish(account_id, dec!(20));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.account_id, account_id);
        assert_eq!(event.balance, dec!(20));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let notifier = BalanceNotifier::new();
        // Must not panic or error
        notifier.publish(Uuid::new_v4(), dec!(0));
    }
}
