use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Account, AccountId, Transaction};

/// Ledger snapshot for full JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for writing ledger data as CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export accounts with their current balances to CSV
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "account_number", "owner_name", "balance"])?;

        for account in &accounts {
            csv_writer.write_record([
                account.id.to_string(),
                account.account_number.clone(),
                account.owner_name.clone(),
                account.balance.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export transactions to CSV, optionally restricted to one account.
    /// An empty result writes just the header.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        writer: W,
        account_id: Option<AccountId>,
    ) -> Result<usize> {
        let transactions: Vec<Transaction> = self
            .service
            .list_all_transactions()
            .await?
            .into_iter()
            .filter(|t| account_id.is_none_or(|id| t.account_id == id))
            .collect();

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["id", "account_id", "amount", "transaction_type", "timestamp"])?;

        for transaction in &transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.account_id.to_string(),
                transaction.amount.to_string(),
                transaction.transaction_type.as_str().to_string(),
                transaction.timestamp.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export the whole ledger as a pretty-printed JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: self.service.list_accounts().await?,
            transactions: self.service.list_all_transactions().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
