use anyhow::Result;
use clap::Parser;
use lkh_bank::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; flags and the process environment still apply.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    cli.init_tracing();
    cli.run().await
}
