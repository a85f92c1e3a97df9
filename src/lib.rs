//! Balance ledger and order settlement engine
//!
//! Core of a consumer recharge/payment platform: debits stored-value
//! balances when business orders or withdrawals are created, keeps an
//! append-only transaction trail, and reconciles orders left pending past
//! their expiry deadline.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod settlement;
pub mod store;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, SessionContext, SettlementError};
pub use error::{AppError, AppResult};
pub use monitor::OrderExpiryMonitor;
pub use notify::{BalanceChanged, BalanceNotifier};
pub use settlement::{
    CreateOrderCommand, CreateWithdrawalCommand, OrderSettlementService,
    WithdrawalSettlementService,
};
