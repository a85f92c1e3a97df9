//! API module
//!
//! HTTP surface over the settlement services. Authentication and session
//! management are out of scope; callers supply the session user through the
//! `X-Session-User-Id` header set by the upstream auth layer.

pub mod middleware;
pub mod routes;

use axum::middleware as axum_middleware;
use axum::Router;
use sqlx::PgPool;

use crate::notify::BalanceNotifier;
use crate::settlement::{OrderSettlementService, WithdrawalSettlementService};
use crate::store::{AccountStore, OrderStore, TransactionLedger};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub orders: OrderSettlementService,
    pub withdrawals: WithdrawalSettlementService,
    pub accounts: AccountStore,
    pub order_store: OrderStore,
    pub ledger: TransactionLedger,
    pub notifier: BalanceNotifier,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let notifier = BalanceNotifier::new();
        Self {
            orders: OrderSettlementService::new(pool.clone(), notifier.clone()),
            withdrawals: WithdrawalSettlementService::new(pool.clone(), notifier.clone()),
            accounts: AccountStore::new(pool.clone()),
            order_store: OrderStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool.clone()),
            pool,
            notifier,
        }
    }
}

/// Build the API router with request logging applied
pub fn create_router(state: AppState) -> Router {
    routes::create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}
