//! Settlement module
//!
//! The two services that are allowed to mutate account balances. Both follow
//! the same shape: validate, read the balance, then insert + conditional
//! debit + ledger append in one transaction.

mod order;
mod withdrawal;

pub use order::{CreateOrderCommand, OrderSettlementService};
pub use withdrawal::{CreateWithdrawalCommand, WithdrawalSettlementService};
