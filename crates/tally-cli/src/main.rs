//! Tally CLI - Financial insight from raw bank transactions
//!
//! Usage:
//!   tally classify --input ledger.json         Label every transaction
//!   tally snapshot --input ledger.json         Spending behavior snapshot
//!   tally statement --from 2025-01 --to 2025-06  Multi-month statement
//!   tally balance-sheet --input ledger.json    Net worth from balances

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let ledger = commands::load_ledger(&cli.input)?;

    match cli.command {
        Commands::Classify => commands::cmd_classify(&ledger, cli.json),
        Commands::Snapshot => commands::cmd_snapshot(&ledger, cli.json),
        Commands::Metrics => commands::cmd_metrics(&ledger, cli.json),
        Commands::Trend => commands::cmd_trend(&ledger, cli.json),
        Commands::Categories => commands::cmd_categories(&ledger, cli.json),
        Commands::Statement { from, to } => {
            commands::cmd_statement(&ledger, from.as_deref(), to.as_deref(), cli.json)
        }
        Commands::BalanceSheet => commands::cmd_balance_sheet(&ledger, cli.json),
    }
}
