//! Order types
//!
//! Business orders created by the settlement path. The charge happens at
//! creation time, not at fulfillment, so an order row is only ever inserted
//! together with its debit.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle states.
///
/// `Pending -> Expired` and `Pending -> Cancelled` are driven by the expiry
/// monitor; `Completed` is set by the out-of-scope fulfillment process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "expired" => Some(OrderStatus::Expired),
            _ => None,
        }
    }

    /// Terminal states can never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Expired
        )
    }
}

/// A persisted business order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    /// Human-traceable token, globally unique (timestamp + random suffix)
    pub order_no: String,
    pub account_id: Uuid,
    /// Business type of the order, e.g. "phone_recharge"
    pub business_type: String,
    /// Account being recharged / paid for (phone number, utility account, ...)
    pub target_account: String,
    /// Requested face amount
    pub amount: Decimal,
    /// Actual (discounted) amount charged
    pub actual_amount: Decimal,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new order row, inserted in `pending` status.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub order_no: String,
    pub account_id: Uuid,
    pub business_type: String,
    pub target_account: String,
    pub amount: Decimal,
    pub actual_amount: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
}

impl NewOrder {
    pub fn new(
        account_id: Uuid,
        business_type: String,
        target_account: String,
        amount: Decimal,
        actual_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_no: generate_order_no(),
            account_id,
            business_type,
            target_account,
            amount,
            actual_amount,
            expires_at: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Generate a unique order number: UTC timestamp down to milliseconds plus a
/// 6-digit random suffix. The `orders.order_no` unique index backs the
/// global-uniqueness guarantee.
pub fn generate_order_no() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", timestamp, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Expired,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_generate_order_no_shape() {
        let order_no = generate_order_no();
        // 17 timestamp digits + 6 suffix digits
        assert_eq!(order_no.len(), 23);
        assert!(order_no.chars().all(|c| c.is_ascii_digit()));
        assert!(order_no.starts_with("20"));
    }

    #[test]
    fn test_generate_order_no_varies() {
        let a = generate_order_no();
        let b = generate_order_no();
        // Random suffix makes same-millisecond collisions vanishingly rare
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_order_defaults() {
        let order = NewOrder::new(
            Uuid::new_v4(),
            "phone_recharge".to_string(),
            "13800000000".to_string(),
            Decimal::new(100, 0),
            Decimal::new(80, 0),
        );

        assert!(order.expires_at.is_none());
        assert!(order.metadata.is_object());
        assert_eq!(order.actual_amount, Decimal::new(80, 0));
    }
}
