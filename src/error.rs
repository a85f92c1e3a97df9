//! Error handling module
//!
//! Centralized error types and HTTP response conversion. Every failure maps
//! to a short categorized message; raw store errors are logged server-side
//! and never shown to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::SettlementError;
use crate::monitor::MonitorError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Order not found or not pending: {0}")]
    OrderNotPending(Uuid),

    // Settlement errors (spec'd taxonomy)
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<MonitorError> for AppError {
    fn from(e: MonitorError) -> Self {
        match e {
            MonitorError::Database(e) => AppError::Database(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }
            AppError::OrderNotPending(id) => {
                (StatusCode::CONFLICT, "order_not_pending", Some(id.to_string()))
            }

            AppError::Settlement(ref err) => match err {
                SettlementError::AccountNotFound(id) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
                }
                SettlementError::PayoutAccountNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "payout_account_not_found",
                    Some(id.to_string()),
                ),
                SettlementError::InsufficientBalance { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_balance",
                    Some(err.to_string()),
                ),
                SettlementError::InvalidAmount(e) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(e.to_string()))
                }
                SettlementError::DebitConflict { .. } => {
                    // The loser of an optimistic race; safe to retry
                    (StatusCode::CONFLICT, "debit_conflict", Some(err.to_string()))
                }
                SettlementError::OrderInsertFailed(e) => {
                    tracing::error!(error = %e, "Order insert failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "order_insert_failed", None)
                }
                SettlementError::DebitFailed(e) => {
                    tracing::error!(error = %e, "Balance debit failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "debit_failed", None)
                }
                SettlementError::LedgerAppendFailed(e) => {
                    tracing::error!(error = %e, "Ledger append failed, settlement rolled back");
                    (StatusCode::INTERNAL_SERVER_ERROR, "ledger_append_failed", None)
                }
            },

            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_balance_message() {
        let err: AppError =
            SettlementError::insufficient_balance(dec!(50), dec!(80)).into();

        let msg = err.to_string();
        assert!(msg.contains("current 50"));
        assert!(msg.contains("required 80"));
    }

    #[test]
    fn test_monitor_error_converts_to_database() {
        let err: AppError = MonitorError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
