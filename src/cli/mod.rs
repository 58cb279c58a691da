use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::LedgerService;
use crate::domain::{AccountId, Amount, format_amount, parse_amount};

/// LKH Bank - accounts, deposits, withdrawals and transfers
#[derive(Parser)]
#[command(name = "lkh-bank")]
#[command(about = "A small bank ledger with an HTTP API, backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "BANK_DATABASE", default_value = "bank.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and schema if they do not exist
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "BANK_HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "BANK_PORT", default_value = "8000")]
        port: u16,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Deposit money into an account
    Deposit {
        /// Account ID
        account_id: AccountId,

        /// Amount to deposit (e.g., "100" or "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Account ID
        account_id: AccountId,

        /// Amount to withdraw
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Transfer money between two accounts
    Transfer {
        /// Amount to transfer
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Source account ID
        #[arg(long)]
        from: AccountId,

        /// Destination account ID
        #[arg(long)]
        to: AccountId,
    },

    /// List the transactions of an account
    Transactions {
        /// Account ID
        account_id: AccountId,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: accounts, transactions, full
        export_type: String,

        /// Only export transactions of this account
        #[arg(long)]
        account: Option<AccountId>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account
    Create {
        /// Account number (must be unique)
        account_number: String,

        /// Owner name
        owner_name: String,
    },

    /// Show a single account
    Show {
        /// Account ID
        id: AccountId,
    },

    /// List all accounts
    List,
}

impl Cli {
    /// Install the global tracing subscriber.
    /// `RUST_LOG` wins; otherwise `--verbose` switches from info to debug.
    pub fn init_tracing(&self) {
        let default_filter = if self.verbose {
            "lkh_bank=debug,tower_http=debug"
        } else {
            "lkh_bank=info,tower_http=info"
        };

        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    pub async fn run(self) -> Result<()> {
        let service = LedgerService::init(&self.database)
            .await
            .with_context(|| format!("Failed to open database: {}", self.database))?;
        tracing::debug!(database = %self.database, "database ready");

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve { host, port } => {
                crate::api::serve(service, SocketAddr::new(host, port)).await?;
            }

            Commands::Account(account_cmd) => {
                run_account_command(&service, account_cmd).await?;
            }

            Commands::Deposit { account_id, amount } => {
                let amount = parse_amount_arg(&amount)?;
                let change = service.deposit(account_id, amount).await?;
                println!(
                    "Deposited {} into account {} (balance: {})",
                    format_amount(amount),
                    change.account.account_number,
                    format_amount(change.account.balance)
                );
            }

            Commands::Withdraw { account_id, amount } => {
                let amount = parse_amount_arg(&amount)?;
                let change = service.withdraw(account_id, amount).await?;
                println!(
                    "Withdrew {} from account {} (balance: {})",
                    format_amount(amount),
                    change.account.account_number,
                    format_amount(change.account.balance)
                );
            }

            Commands::Transfer { amount, from, to } => {
                let amount = parse_amount_arg(&amount)?;
                let result = service.transfer(from, to, amount).await?;
                println!(
                    "Transferred {} {} -> {}",
                    format_amount(amount),
                    result.from_account.account_number,
                    result.to_account.account_number
                );
                println!(
                    "  {}: {}",
                    result.from_account.account_number,
                    format_amount(result.from_account.balance)
                );
                println!(
                    "  {}: {}",
                    result.to_account.account_number,
                    format_amount(result.to_account.balance)
                );
            }

            Commands::Transactions { account_id } => {
                run_transactions_command(&service, account_id).await?;
            }

            Commands::Export {
                export_type,
                account,
                output,
            } => {
                run_export_command(&service, &export_type, account, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn parse_amount_arg(input: &str) -> Result<Amount> {
    parse_amount(input).with_context(|| format!("Invalid amount '{}'. Use '50' or '12.50'", input))
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            account_number,
            owner_name,
        } => {
            let account = service.create_account(&account_number, &owner_name).await?;
            println!(
                "Created account: {} ({}) with id {}",
                account.account_number, account.owner_name, account.id
            );
        }

        AccountCommands::Show { id } => {
            let account = service.get_account(id).await?;
            println!("Account: {}", account.account_number);
            println!("  ID:      {}", account.id);
            println!("  Owner:   {}", account.owner_name);
            println!("  Balance: {}", format_amount(account.balance));
        }

        AccountCommands::List => {
            let accounts = service.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<6} {:<16} {:<24} {:>12}", "ID", "NUMBER", "OWNER", "BALANCE");
                println!("{}", "-".repeat(61));
                for account in accounts {
                    println!(
                        "{:<6} {:<16} {:<24} {:>12}",
                        account.id,
                        account.account_number,
                        account.owner_name,
                        format_amount(account.balance)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_transactions_command(service: &LedgerService, account_id: AccountId) -> Result<()> {
    let transactions = service.get_transactions(account_id).await?;

    println!("{:<6} {:<20} {:<14} {:>12}", "ID", "DATE", "TYPE", "AMOUNT");
    println!("{}", "-".repeat(55));
    for transaction in transactions {
        println!(
            "{:<6} {:<20} {:<14} {:>12}",
            transaction.id,
            transaction.timestamp.format("%Y-%m-%d %H:%M:%S"),
            transaction.transaction_type,
            format_amount(transaction.amount)
        );
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    account: Option<AccountId>,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "accounts" => {
            let count = exporter.export_accounts_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} accounts", count);
            }
        }
        "transactions" => {
            let count = exporter.export_transactions_csv(writer, account).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} accounts, {} transactions",
                    snapshot.accounts.len(),
                    snapshot.transactions.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown export type '{}'. Valid types: accounts, transactions, full",
                export_type
            );
        }
    }

    Ok(())
}
