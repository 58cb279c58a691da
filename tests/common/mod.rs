// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use lkh_bank::application::LedgerService;
use lkh_bank::domain::Account;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: the two accounts used throughout the scenarios
pub struct StandardAccounts {
    pub alice: Account,
    pub bob: Account,
}

impl StandardAccounts {
    /// Create ACC1 (Alice) and ACC2 (Bob), both empty
    pub async fn create(service: &LedgerService) -> Result<Self> {
        let alice = service.create_account("ACC1", "Alice").await?;
        let bob = service.create_account("ACC2", "Bob").await?;
        Ok(Self { alice, bob })
    }

    /// Create both accounts and fund Alice with `amount`
    pub async fn create_funded(service: &LedgerService, amount: f64) -> Result<Self> {
        let accounts = Self::create(service).await?;
        service.deposit(accounts.alice.id, amount).await?;
        Ok(accounts)
    }
}
