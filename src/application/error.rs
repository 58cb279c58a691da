use thiserror::Error;

use crate::domain::{AccountId, Amount};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("One or both accounts not found: {from} -> {to}")]
    AccountsNotFound { from: AccountId, to: AccountId },

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("No transactions found for account {0}")]
    NoTransactions(AccountId),

    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    #[error("Insufficient funds in account {account_id}: balance {balance}, required {requested}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
