//! API Routes
//!
//! HTTP endpoint definitions over the settlement services.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, Order, SessionContext, SettlementError, TransactionRecord};
use crate::error::AppError;
use crate::monitor;
use crate::settlement::{CreateOrderCommand, CreateWithdrawalCommand};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub account_id: Uuid,
    pub business_type: String,
    pub target_account: String,
    /// Requested face amount (string for precise decimals)
    pub amount: String,
    /// Actual amount to charge
    pub actual_amount: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_no: String,
    pub account_id: Uuid,
    pub business_type: String,
    pub target_account: String,
    pub amount: Decimal,
    pub actual_amount: Decimal,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWithdrawalRequest {
    pub account_id: Uuid,
    pub amount: String,
    pub payout_account_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub fee: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CloseOrderRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CloseOrderResponse {
    pub order_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub balance: Decimal,
    pub frozen_balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

// =========================================================================
// Router
// =========================================================================

/// Create the API router (state applied by the caller)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id/close", post(close_order))
        .route("/withdrawals", post(create_withdrawal))
        .route("/accounts/:id/balance", get(get_balance))
        .route("/accounts/:id/orders", get(list_orders))
        .route("/accounts/:id/transactions", get(list_transactions))
}

// =========================================================================
// Handlers
// =========================================================================

/// POST /orders - create and settle a business order
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let amount: Amount = req
        .amount
        .parse()
        .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {}", e)))?;
    let actual_amount: Amount = req
        .actual_amount
        .parse()
        .map_err(|e| AppError::InvalidRequest(format!("Invalid actual_amount: {}", e)))?;

    let mut command = CreateOrderCommand::new(
        req.account_id,
        req.business_type,
        req.target_account,
        amount.value(),
        actual_amount.value(),
    );
    if let Some(expires_at) = req.expires_at {
        command = command.with_expires_at(expires_at);
    }
    if let Some(metadata) = req.metadata {
        command = command.with_metadata(metadata);
    }

    let order = state.orders.create_order(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            id: order.id,
            order_no: order.order_no,
            account_id: order.account_id,
            business_type: order.business_type,
            target_account: order.target_account,
            amount: order.amount,
            actual_amount: order.actual_amount,
            status: order.status,
            expires_at: order.expires_at,
            created_at: order.created_at,
        }),
    ))
}

/// POST /withdrawals - create and settle a withdrawal request
async fn create_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), AppError> {
    let ctx = session_from_headers(&headers)?;

    let amount: Amount = req
        .amount
        .parse()
        .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {}", e)))?;

    let command =
        CreateWithdrawalCommand::new(req.account_id, amount.value(), req.payout_account_id);

    let request = state.withdrawals.create_withdrawal(&ctx, command).await?;

    Ok((
        StatusCode::CREATED,
        Json(WithdrawalResponse {
            id: request.id,
            account_id: request.account_id,
            amount: request.amount,
            fee: request.fee,
            status: request.status,
            created_at: request.created_at,
        }),
    ))
}

/// POST /orders/{id}/close - manually cancel a pending order
async fn close_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<CloseOrderRequest>,
) -> Result<Json<CloseOrderResponse>, AppError> {
    let closed = monitor::close_order(&state.pool, order_id, &req.reason).await?;

    if !closed {
        return Err(AppError::OrderNotPending(order_id));
    }

    Ok(Json(CloseOrderResponse {
        order_id,
        status: "cancelled".to_string(),
    }))
}

/// GET /accounts/{id}/balance
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = state
        .accounts
        .get(account_id)
        .await?
        .ok_or(SettlementError::AccountNotFound(account_id))?;

    Ok(Json(BalanceResponse {
        account_id: account.id,
        balance: account.balance,
        frozen_balance: account.frozen_balance,
    }))
}

/// GET /accounts/{id}/orders
async fn list_orders(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Order>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let orders = state.order_store.list_by_account(account_id, limit).await?;

    Ok(Json(orders))
}

/// GET /accounts/{id}/transactions
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let records = state.ledger.list_by_account(account_id, limit).await?;

    Ok(Json(records))
}

/// Resolve the session user from the `X-Session-User-Id` header set by the
/// upstream auth layer.
fn session_from_headers(headers: &HeaderMap) -> Result<SessionContext, AppError> {
    let user_id = headers
        .get("X-Session-User-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::MissingHeader("X-Session-User-Id".to_string()))?;

    let user_id: Uuid = user_id
        .parse()
        .map_err(|_| AppError::InvalidRequest("Invalid X-Session-User-Id header".to_string()))?;

    let mut ctx = SessionContext::new(user_id);

    if let Some(correlation_id) = headers
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
    {
        ctx = ctx.with_correlation_id(correlation_id);
    }

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_headers() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("X-Session-User-Id", user_id.to_string().parse().unwrap());

        let ctx = session_from_headers(&headers).unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert!(ctx.correlation_id.is_none());
    }

    #[test]
    fn test_session_header_missing() {
        let headers = HeaderMap::new();
        let err = session_from_headers(&headers).unwrap_err();
        assert!(matches!(err, AppError::MissingHeader(_)));
    }

    #[test]
    fn test_session_header_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Session-User-Id", "not-a-uuid".parse().unwrap());

        let err = session_from_headers(&headers).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_create_order_request_deserializes() {
        let json = serde_json::json!({
            "account_id": Uuid::new_v4(),
            "business_type": "phone_recharge",
            "target_account": "13800000000",
            "amount": "100.00",
            "actual_amount": "80.00"
        });

        let req: CreateOrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.actual_amount, "80.00");
        assert!(req.expires_at.is_none());
        assert!(req.metadata.is_none());
    }
}
