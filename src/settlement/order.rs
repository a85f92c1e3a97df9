//! Order Settlement Service
//!
//! Creates a business order and debits the purchaser's balance atomically.
//! The charge happens at order creation, not at fulfillment: the order row,
//! the compare-and-swap debit and the ledger record commit in one
//! transaction, so an order can never exist without its debit and vice
//! versa.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Amount, Balance, NewOrder, NewTransactionRecord, Order, SettlementError, TransactionType,
};
use crate::error::AppError;
use crate::notify::BalanceNotifier;
use crate::store::{AccountStore, OrderStore, TransactionLedger};

/// Command to create and settle a business order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub account_id: Uuid,
    /// Business type, e.g. "phone_recharge"
    pub business_type: String,
    /// Account being recharged (phone number, utility account, ...)
    pub target_account: String,
    /// Requested face amount
    pub amount: Decimal,
    /// Actual (discounted) amount to charge
    pub actual_amount: Decimal,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub metadata: serde_json::Value,
}

impl CreateOrderCommand {
    pub fn new(
        account_id: Uuid,
        business_type: String,
        target_account: String,
        amount: Decimal,
        actual_amount: Decimal,
    ) -> Self {
        Self {
            account_id,
            business_type,
            target_account,
            amount,
            actual_amount,
            expires_at: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_expires_at(mut self, expires_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Service settling business orders against account balances.
#[derive(Debug, Clone)]
pub struct OrderSettlementService {
    pool: PgPool,
    accounts: AccountStore,
    orders: OrderStore,
    ledger: TransactionLedger,
    notifier: BalanceNotifier,
}

impl OrderSettlementService {
    pub fn new(pool: PgPool, notifier: BalanceNotifier) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            orders: OrderStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Create an order and settle its debit.
    ///
    /// Steps: validate the charge amount, load the account, check
    /// sufficiency against the balance read here, then in one transaction
    /// insert the pending order, debit via compare-and-swap conditioned on
    /// that same balance, and append the ledger record. A lost race rolls
    /// everything back and surfaces `DebitConflict`; the caller may retry
    /// with a fresh call.
    pub async fn create_order(&self, command: CreateOrderCommand) -> Result<Order, AppError> {
        let charge = Amount::new(command.actual_amount).map_err(SettlementError::from)?;

        let account = self
            .accounts
            .get(command.account_id)
            .await?
            .ok_or(SettlementError::AccountNotFound(command.account_id))?;

        let balance = Balance::new(account.balance)
            .map_err(|e| AppError::Internal(format!("corrupt balance for {}: {}", account.id, e)))?;

        if !balance.is_sufficient_for(&charge) {
            return Err(SettlementError::insufficient_balance(
                balance.value(),
                charge.value(),
            )
            .into());
        }

        let new_order = NewOrder {
            expires_at: command.expires_at,
            metadata: command.metadata,
            ..NewOrder::new(
                account.id,
                command.business_type.clone(),
                command.target_account.clone(),
                command.amount,
                command.actual_amount,
            )
        };

        let mut tx = self.pool.begin().await?;

        let order = self
            .orders
            .insert(&mut tx, &new_order)
            .await
            .map_err(|e| SettlementError::OrderInsertFailed(e.to_string()))?;

        let debited = self
            .accounts
            .debit_if_balance(&mut tx, account.id, balance.value(), charge.value())
            .await
            .map_err(|e| SettlementError::DebitFailed(e.to_string()))?;

        if !debited {
            // Lost the race: rolling back also removes the order row, the
            // transactional equivalent of the compensating delete.
            tx.rollback().await?;
            tracing::warn!(
                account_id = %account.id,
                order_no = %order.order_no,
                "Conditional debit lost a race, order rolled back"
            );
            return Err(SettlementError::DebitConflict {
                account_id: account.id,
            }
            .into());
        }

        let record = NewTransactionRecord::debit(
            account.id,
            &charge,
            balance.value(),
            TransactionType::OrderPayment,
            format!(
                "{} order {} to {}",
                command.business_type, order.order_no, command.target_account
            ),
        );

        self.ledger
            .append(&mut tx, &record)
            .await
            .map_err(|e| SettlementError::LedgerAppendFailed(e.to_string()))?;

        tx.commit().await?;

        let new_balance = record.balance_after();
        self.notifier.publish(account.id, new_balance);

        tracing::info!(
            account_id = %account.id,
            order_no = %order.order_no,
            amount = %charge,
            balance = %new_balance,
            "Order settled"
        );

        Ok(order)
    }
}
