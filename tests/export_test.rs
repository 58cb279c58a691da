mod common;

use anyhow::Result;
use common::{StandardAccounts, test_service};
use lkh_bank::io::Exporter;

#[tokio::test]
async fn test_export_accounts_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardAccounts::create_funded(&service, 12.5).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_accounts_csv(&mut buffer)
        .await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,account_number,owner_name,balance");
    assert_eq!(lines[1], "1,ACC1,Alice,12.5");
    assert_eq!(lines[2], "2,ACC2,Bob,0");
    Ok(())
}

#[tokio::test]
async fn test_export_transactions_csv_for_one_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 100.0).await?;
    service
        .transfer(accounts.alice.id, accounts.bob.id, 25.0)
        .await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_transactions_csv(&mut buffer, Some(accounts.bob.id))
        .await?;
    assert_eq!(count, 1);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(",25,transfer_in,"));
    Ok(())
}

#[tokio::test]
async fn test_export_transactions_csv_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_transactions_csv(&mut buffer, None)
        .await?;
    assert_eq!(count, 0);
    assert_eq!(
        String::from_utf8(buffer)?.trim_end(),
        "id,account_id,amount,transaction_type,timestamp"
    );
    Ok(())
}

#[tokio::test]
async fn test_export_full_json() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let accounts = StandardAccounts::create_funded(&service, 100.0).await?;
    service.withdraw(accounts.alice.id, 10.0).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service).export_full_json(&mut buffer).await?;
    assert_eq!(snapshot.accounts.len(), 2);
    assert_eq!(snapshot.transactions.len(), 2);

    let parsed: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed["accounts"][0]["balance"].as_f64(), Some(90.0));
    assert_eq!(parsed["transactions"][1]["transaction_type"], "withdrawal");
    Ok(())
}
