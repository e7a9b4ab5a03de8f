//! Loading the aggregator export bundle

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::Ledger;
use tracing::debug;

/// Read and parse the JSON bundle of transactions and accounts
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input bundle: {}", path.display()))?;
    let ledger = Ledger::from_json_str(&raw)
        .with_context(|| format!("Failed to parse input bundle: {}", path.display()))?;
    debug!(
        transactions = ledger.transactions.len(),
        accounts = ledger.accounts.len(),
        "loaded input bundle"
    );
    Ok(ledger)
}
