use serde::{Deserialize, Serialize};

use super::Amount;

pub type AccountId = i64;

/// A customer account. The balance only changes through deposits,
/// withdrawals and transfers, each of which leaves a transaction row behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Caller-supplied identifier, unique across the ledger
    pub account_number: String,
    pub owner_name: String,
    pub balance: Amount,
}

impl Account {
    pub fn with_balance(mut self, balance: Amount) -> Self {
        self.balance = balance;
        self
    }
}
