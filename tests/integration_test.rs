mod common;

use anyhow::Result;
use common::{StandardAccounts, test_service};
use lkh_bank::application::AppError;
use lkh_bank::domain::TransactionKind;
use lkh_bank::storage::{Repository, is_unique_violation};
use tempfile::TempDir;

#[tokio::test]
async fn test_new_account_starts_at_zero() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let account = service.create_account("ACC1", "Alice").await?;
    assert_eq!(account.account_number, "ACC1");
    assert_eq!(account.owner_name, "Alice");
    assert_eq!(account.balance, 0.0);

    let stored = service.get_account(account.id).await?;
    assert_eq!(stored, account);

    Ok(())
}

#[tokio::test]
async fn test_account_numbers_are_unique() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.create_account("ACC1", "Alice").await?;
    let err = service.create_account("ACC1", "Mallory").await.unwrap_err();
    assert!(matches!(err, AppError::AccountAlreadyExists(ref n) if n == "ACC1"));

    assert_eq!(service.list_accounts().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_insert_is_a_unique_violation() -> Result<()> {
    let temp = TempDir::new()?;
    let db_url = format!("sqlite:{}?mode=rwc", temp.path().join("test.db").display());
    let repo = Repository::init(&db_url).await?;

    repo.create_account("ACC1", "Alice").await?;
    let err = repo.create_account("ACC1", "Mallory").await.unwrap_err();
    assert!(is_unique_violation(&err));

    let other = anyhow::anyhow!("connection reset");
    assert!(!is_unique_violation(&other));
    Ok(())
}

#[tokio::test]
async fn test_get_missing_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_account(42).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(42)));
    Ok(())
}

#[tokio::test]
async fn test_list_accounts_in_creation_order() -> Result<()> {
    let (service, _temp) = test_service().await?;

    StandardAccounts::create(&service).await?;
    service.create_account("ACC3", "Carol").await?;

    let numbers: Vec<String> = service
        .list_accounts()
        .await?
        .into_iter()
        .map(|a| a.account_number)
        .collect();
    assert_eq!(numbers, vec!["ACC1", "ACC2", "ACC3"]);
    Ok(())
}

#[tokio::test]
async fn test_deposit_increases_balance_and_records_transaction() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create(&service).await?;

    let change = service.deposit(accounts.alice.id, 100.0).await?;
    assert_eq!(change.account.balance, 100.0);
    assert_eq!(change.transaction.amount, 100.0);
    assert_eq!(change.transaction.transaction_type, TransactionKind::Deposit);
    assert_eq!(change.transaction.account_id, accounts.alice.id);

    assert_eq!(service.get_account(accounts.alice.id).await?.balance, 100.0);

    let history = service.get_transactions(accounts.alice.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], change.transaction);

    Ok(())
}

#[tokio::test]
async fn test_deposit_accepts_zero_and_negative_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 10.0).await?;

    let change = service.deposit(accounts.alice.id, 0.0).await?;
    assert_eq!(change.account.balance, 10.0);

    let change = service.deposit(accounts.alice.id, -4.0).await?;
    assert_eq!(change.account.balance, 6.0);

    assert_eq!(service.get_transactions(accounts.alice.id).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_deposit_into_missing_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.deposit(7, 10.0).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(7)));
    assert!(service.list_all_transactions().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_withdrawal_within_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 100.0).await?;

    let change = service.withdraw(accounts.alice.id, 30.0).await?;
    assert_eq!(change.account.balance, 70.0);
    assert_eq!(
        change.transaction.transaction_type,
        TransactionKind::Withdrawal
    );

    // Draining to exactly zero is allowed
    let change = service.withdraw(accounts.alice.id, 70.0).await?;
    assert_eq!(change.account.balance, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_overdraft_is_rejected_without_side_effects() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 50.0).await?;

    let err = service.withdraw(accounts.alice.id, 50.01).await.unwrap_err();
    match err {
        AppError::InsufficientFunds {
            account_id,
            balance,
            requested,
        } => {
            assert_eq!(account_id, accounts.alice.id);
            assert_eq!(balance, 50.0);
            assert_eq!(requested, 50.01);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    assert_eq!(service.get_account(accounts.alice.id).await?.balance, 50.0);
    assert_eq!(service.get_transactions(accounts.alice.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_negative_withdrawal_credits_the_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create(&service).await?;

    // An empty account always covers a negative amount
    let change = service.withdraw(accounts.alice.id, -5.0).await?;
    assert_eq!(change.account.balance, 5.0);
    assert_eq!(change.transaction.amount, -5.0);

    let history = service.get_transactions(accounts.alice.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_type, TransactionKind::Withdrawal);
    assert_eq!(service.get_account(accounts.alice.id).await?.balance, 5.0);
    Ok(())
}

#[tokio::test]
async fn test_record_transaction_dispatches_on_type() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create(&service).await?;

    let change = service
        .record_transaction(accounts.alice.id, 100.0, "deposit")
        .await?;
    assert_eq!(change.account.balance, 100.0);

    let change = service
        .record_transaction(accounts.alice.id, 30.0, "withdrawal")
        .await?;
    assert_eq!(change.account.balance, 70.0);

    Ok(())
}

#[tokio::test]
async fn test_record_transaction_rejects_unknown_and_transfer_types() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 10.0).await?;

    for kind in ["refund", "transfer_in", "transfer_out", "Deposit"] {
        let err = service
            .record_transaction(accounts.alice.id, 5.0, kind)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::InvalidTransactionType(ref t) if t == kind),
            "{kind} should be rejected"
        );
    }

    assert_eq!(service.get_account(accounts.alice.id).await?.balance, 10.0);
    assert_eq!(service.get_transactions(accounts.alice.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_account_is_reported_before_invalid_type() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.record_transaction(99, 5.0, "refund").await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(99)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_type_is_reported_before_insufficient_funds() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create(&service).await?;

    let err = service
        .record_transaction(accounts.alice.id, 1_000.0, "refund")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransactionType(_)));
    Ok(())
}

#[tokio::test]
async fn test_empty_history_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create(&service).await?;

    let err = service.get_transactions(accounts.bob.id).await.unwrap_err();
    assert!(matches!(err, AppError::NoTransactions(id) if id == accounts.bob.id));

    // Same answer for an account that does not exist at all
    let err = service.get_transactions(1234).await.unwrap_err();
    assert!(matches!(err, AppError::NoTransactions(1234)));
    Ok(())
}

#[tokio::test]
async fn test_data_survives_reopening_the_database() -> Result<()> {
    let (service, temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 25.0).await?;
    drop(service);

    let db_path = temp.path().join("test.db");
    let reopened =
        lkh_bank::application::LedgerService::init(db_path.to_str().unwrap()).await?;

    assert_eq!(reopened.get_account(accounts.alice.id).await?.balance, 25.0);
    assert_eq!(reopened.get_transactions(accounts.alice.id).await?.len(), 1);
    Ok(())
}
