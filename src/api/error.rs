use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::AppError;

/// Error body returned by every endpoint: `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Everything a handler can fail with, rendered as status + [`ErrorBody`].
#[derive(Debug)]
pub enum ApiError {
    /// A ledger operation failed
    App(AppError),
    /// The request could not be decoded
    InvalidRequest { status: StatusCode, detail: String },
}

/// JSON body extractor whose rejections use the same `{detail}` body as
/// every other error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path extractor with `{detail}` rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

fn app_status_and_detail(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "Account not found"),
        AppError::AccountsNotFound { .. } => {
            (StatusCode::NOT_FOUND, "One or both accounts not found")
        }
        AppError::NoTransactions(_) => (StatusCode::NOT_FOUND, "No transactions found"),
        AppError::InvalidTransactionType(_) => {
            (StatusCode::BAD_REQUEST, "Invalid transaction type")
        }
        AppError::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, "Insufficient funds"),
        AppError::AccountAlreadyExists(_) => {
            (StatusCode::CONFLICT, "Account number already registered")
        }
        AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::App(err) => {
                let (status, detail) = app_status_and_detail(&err);
                if status.is_server_error() {
                    tracing::error!(error = ?err, "request failed");
                } else {
                    tracing::warn!(error = %err, "request rejected");
                }
                (status, detail.to_string())
            }
            ApiError::InvalidRequest { status, detail } => {
                tracing::warn!(%status, %detail, "invalid request");
                (status, detail)
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
