//! Store module
//!
//! Thin sqlx repositories over the ledger store tables. All balance-mutating
//! statements take the caller's open transaction so the settlement services
//! can compose them atomically.

mod accounts;
mod ledger;
mod orders;
mod withdrawals;

pub use accounts::{AccountRow, AccountStore};
pub use ledger::TransactionLedger;
pub use orders::OrderStore;
pub use withdrawals::WithdrawalStore;
