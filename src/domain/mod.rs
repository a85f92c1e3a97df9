//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod context;
pub mod error;
pub mod ledger;
pub mod order;
pub mod withdrawal;

pub use amount::{Amount, AmountError, Balance};
pub use context::SessionContext;
pub use error::SettlementError;
pub use ledger::{NewTransactionRecord, TransactionRecord, TransactionStatus, TransactionType};
pub use order::{generate_order_no, NewOrder, Order, OrderStatus};
pub use withdrawal::{PaymentAccount, WithdrawalRequest, WithdrawalStatus};
