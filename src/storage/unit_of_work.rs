use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, Sqlite};

use crate::domain::{Account, AccountId, Amount, Transaction, TransactionKind};

use super::repository::{ACCOUNT_COLUMNS, row_to_account};

/// A group of reads and writes that become visible together or not at all.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it
/// back, so every early return on an error path leaves the store untouched.
pub struct UnitOfWork {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(super) fn new(tx: sqlx::Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Get an account by ID inside this unit of work.
    pub async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Add `amount` to an account balance and return the new balance.
    /// Returns `None` if the account does not exist.
    pub async fn credit(&mut self, id: AccountId, amount: Amount) -> Result<Option<Amount>> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + ?
            WHERE id = ?
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to credit account")?;

        row.map(|row| row.try_get("balance"))
            .transpose()
            .context("Invalid balance")
    }

    /// Subtract `amount` from an account balance if the balance covers it,
    /// returning the new balance.
    ///
    /// The funds check and the write are one statement, so two debits racing
    /// on the same account cannot both pass against a stale balance.
    /// Returns `None` if the account does not exist or cannot cover `amount`.
    pub async fn debit(&mut self, id: AccountId, amount: Amount) -> Result<Option<Amount>> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - ?
            WHERE id = ? AND balance >= ?
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to debit account")?;

        row.map(|row| row.try_get("balance"))
            .transpose()
            .context("Invalid balance")
    }

    /// Record a transaction row. The store assigns the id and timestamp.
    pub async fn insert_transaction(
        &mut self,
        account_id: AccountId,
        amount: Amount,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let timestamp = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, amount, transaction_type, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(kind.as_str())
        .bind(timestamp.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .context("Failed to save transaction")?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            account_id,
            amount,
            transaction_type: kind,
            timestamp,
        })
    }

    /// Make every write in this unit of work durable.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}
