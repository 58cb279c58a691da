use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::application::LedgerService;
use crate::domain::{Account, AccountId, Amount, Transaction};

use super::{ApiError, JsonBody, PathParam};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account_number: String,
    pub owner_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub account_id: AccountId,
    pub amount: Amount,
    pub transaction_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub message: String,
    pub new_balance: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub message: String,
    pub from_account_balance: Amount,
    pub to_account_balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /accounts/
pub async fn create_account(
    State(service): State<LedgerService>,
    JsonBody(request): JsonBody<CreateAccountRequest>,
) -> ApiResult<Account> {
    let account = service
        .create_account(&request.account_number, &request.owner_name)
        .await?;
    Ok(Json(account))
}

/// GET /accounts/{id}
pub async fn get_account(
    State(service): State<LedgerService>,
    PathParam(account_id): PathParam<AccountId>,
) -> ApiResult<Account> {
    Ok(Json(service.get_account(account_id).await?))
}

/// GET /accounts/
pub async fn list_accounts(State(service): State<LedgerService>) -> ApiResult<Vec<Account>> {
    Ok(Json(service.list_accounts().await?))
}

/// GET /accounts/{id}/transactions
pub async fn get_account_transactions(
    State(service): State<LedgerService>,
    PathParam(account_id): PathParam<AccountId>,
) -> ApiResult<Vec<Transaction>> {
    Ok(Json(service.get_transactions(account_id).await?))
}

/// POST /transactions/
pub async fn create_transaction(
    State(service): State<LedgerService>,
    JsonBody(request): JsonBody<TransactionRequest>,
) -> ApiResult<TransactionResponse> {
    let change = service
        .record_transaction(
            request.account_id,
            request.amount,
            &request.transaction_type,
        )
        .await?;

    Ok(Json(TransactionResponse {
        message: "Transaction successful".to_string(),
        new_balance: change.account.balance,
    }))
}

/// POST /transfer/
pub async fn transfer_money(
    State(service): State<LedgerService>,
    JsonBody(request): JsonBody<TransferRequest>,
) -> ApiResult<TransferResponse> {
    let result = service
        .transfer(
            request.from_account_id,
            request.to_account_id,
            request.amount,
        )
        .await?;

    Ok(Json(TransferResponse {
        message: "Transfer successful".to_string(),
        from_account_balance: result.from_account.balance,
        to_account_balance: result.to_account.balance,
    }))
}
