use crate::domain::{Account, AccountId, Amount, Transaction, TransactionKind};
use crate::storage::{Repository, UnitOfWork, is_unique_violation};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the single entry point for the HTTP API and the CLI.
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
}

/// Result of a deposit or withdrawal
#[derive(Debug, Clone)]
pub struct BalanceChange {
    /// The account as it stands after the change
    pub account: Account,
    pub transaction: Transaction,
}

/// Result of a transfer between two accounts
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub from_account: Account,
    pub to_account: Account,
    pub outgoing: Transaction,
    pub incoming: Transaction,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating the file and schema if absent.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account with a zero balance.
    pub async fn create_account(
        &self,
        account_number: &str,
        owner_name: &str,
    ) -> Result<Account, AppError> {
        if self
            .repo
            .get_account_by_number(account_number)
            .await?
            .is_some()
        {
            return Err(AppError::AccountAlreadyExists(account_number.to_string()));
        }

        // A concurrent create can still win the race past the lookup above.
        let account = match self.repo.create_account(account_number, owner_name).await {
            Ok(account) => account,
            Err(err) if is_unique_violation(&err) => {
                return Err(AppError::AccountAlreadyExists(account_number.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            account_id = account.id,
            account_number = %account.account_number,
            "account created"
        );
        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// List the transactions recorded against an account.
    ///
    /// An empty history is reported as [`AppError::NoTransactions`], whether
    /// or not the account itself exists.
    pub async fn get_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = self.repo.list_transactions_for_account(account_id).await?;
        if transactions.is_empty() {
            return Err(AppError::NoTransactions(account_id));
        }
        Ok(transactions)
    }

    /// List every transaction in the ledger. Unlike [`Self::get_transactions`]
    /// an empty ledger is not an error.
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    // ========================
    // Balance mutations
    // ========================

    /// Add `amount` to an account. Any amount is accepted, including zero
    /// and negative values.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Amount,
    ) -> Result<BalanceChange, AppError> {
        let mut uow = self.repo.begin().await?;
        let account = load_account(&mut uow, account_id).await?;
        apply_change(uow, account, amount, TransactionKind::Deposit).await
    }

    /// Remove `amount` from an account if its balance covers it.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: Amount,
    ) -> Result<BalanceChange, AppError> {
        let mut uow = self.repo.begin().await?;
        let account = load_account(&mut uow, account_id).await?;
        apply_change(uow, account, amount, TransactionKind::Withdrawal).await
    }

    /// Apply a deposit or withdrawal named by its wire type.
    ///
    /// The account is resolved before the type is validated, so an unknown
    /// account wins over an unknown type.
    pub async fn record_transaction(
        &self,
        account_id: AccountId,
        amount: Amount,
        transaction_type: &str,
    ) -> Result<BalanceChange, AppError> {
        let mut uow = self.repo.begin().await?;
        let account = load_account(&mut uow, account_id).await?;

        let kind = TransactionKind::from_str(transaction_type)
            .filter(TransactionKind::is_direct)
            .ok_or_else(|| AppError::InvalidTransactionType(transaction_type.to_string()))?;

        apply_change(uow, account, amount, kind).await
    }

    /// Move `amount` from one account to another.
    ///
    /// Both balance updates and both transaction rows commit together.
    pub async fn transfer(
        &self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Amount,
    ) -> Result<TransferResult, AppError> {
        let not_found = || AppError::AccountsNotFound {
            from: from_account_id,
            to: to_account_id,
        };

        let mut uow = self.repo.begin().await?;
        let from_account = uow.get_account(from_account_id).await?;
        let to_account = uow.get_account(to_account_id).await?;
        let (Some(from_account), Some(to_account)) = (from_account, to_account) else {
            return Err(not_found());
        };

        let debited = uow
            .debit(from_account.id, amount)
            .await?
            .ok_or(AppError::InsufficientFunds {
                account_id: from_account.id,
                balance: from_account.balance,
                requested: amount,
            })?;
        let credited = uow.credit(to_account.id, amount).await?.ok_or_else(not_found)?;

        let outgoing = uow
            .insert_transaction(from_account.id, amount, TransactionKind::TransferOut)
            .await?;
        let incoming = uow
            .insert_transaction(to_account.id, amount, TransactionKind::TransferIn)
            .await?;

        uow.commit().await?;

        // A transfer to the same account nets out; report the final balance for both sides.
        let from_balance = if from_account.id == to_account.id {
            credited
        } else {
            debited
        };

        tracing::info!(
            from_account_id,
            to_account_id,
            amount,
            from_balance,
            to_balance = credited,
            "transfer recorded"
        );

        Ok(TransferResult {
            from_account: from_account.with_balance(from_balance),
            to_account: to_account.with_balance(credited),
            outgoing,
            incoming,
        })
    }
}

async fn load_account(uow: &mut UnitOfWork, account_id: AccountId) -> Result<Account, AppError> {
    uow.get_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound(account_id))
}

/// Apply a single-account change inside `uow` and commit it.
async fn apply_change(
    mut uow: UnitOfWork,
    account: Account,
    amount: Amount,
    kind: TransactionKind,
) -> Result<BalanceChange, AppError> {
    let new_balance = match kind {
        TransactionKind::Deposit => uow.credit(account.id, amount).await?,
        TransactionKind::Withdrawal => uow.debit(account.id, amount).await?,
        other => return Err(AppError::InvalidTransactionType(other.to_string())),
    };

    let Some(new_balance) = new_balance else {
        return Err(if kind.is_debit() {
            AppError::InsufficientFunds {
                account_id: account.id,
                balance: account.balance,
                requested: amount,
            }
        } else {
            AppError::AccountNotFound(account.id)
        });
    };

    let transaction = uow.insert_transaction(account.id, amount, kind).await?;
    uow.commit().await?;

    tracing::info!(
        account_id = account.id,
        kind = %kind,
        amount,
        new_balance,
        "balance updated"
    );

    Ok(BalanceChange {
        account: account.with_balance(new_balance),
        transaction,
    })
}
