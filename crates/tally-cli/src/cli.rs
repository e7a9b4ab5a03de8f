//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Turn raw bank transactions into financial insight
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Classify bank transactions and build financial statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Aggregator export bundle: JSON with `transactions` and `accounts`
    #[arg(short, long, default_value = "ledger.json", global = true)]
    pub input: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print raw JSON instead of formatted tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every transaction and show the label tally
    Classify,

    /// Spending snapshot: totals, velocity, categories, recurring charges
    Snapshot,

    /// Income/expense metrics for the whole bundle
    Metrics,

    /// Month-over-month cash-flow trend
    Trend,

    /// Ranked expense categories with month-over-month changes
    Categories,

    /// Multi-month financial statement
    Statement {
        /// First statement month (YYYY-MM); defaults to five months
        /// before --to
        #[arg(long)]
        from: Option<String>,

        /// Last statement month (YYYY-MM), inclusive; defaults to the
        /// current month
        #[arg(long)]
        to: Option<String>,
    },

    /// Assets, credit-card debt, and net worth from current balances
    BalanceSheet,
}
