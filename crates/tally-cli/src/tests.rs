//! CLI command tests
//!
//! Smoke tests for the report commands over an in-memory ledger, plus
//! input-bundle loading.

use std::io::Write;

use tally_core::{Account, AccountType, Ledger, Transaction};

use crate::commands::{self, truncate};

fn account(id: &str, account_type: AccountType, balance: f64) -> Account {
    Account {
        id: id.to_string(),
        name: format!("{} account", id),
        account_type,
        subtype: None,
        balance: Some(balance),
        institution: None,
        item_id: None,
    }
}

fn tx(id: &str, amount: f64, category: &str, day: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: day.parse().unwrap(),
        name: format!("{} merchant", id),
        amount,
        category: Some(category.to_string()),
        pending: false,
        account_id: "a1".to_string(),
        transaction_code: None,
        payment_channel: None,
        payment_meta: None,
    }
}

fn test_ledger() -> Ledger {
    Ledger {
        transactions: vec![
            tx("t1", -3000.0, "INCOME", "2025-01-01"),
            tx("t2", 1200.0, "RENT", "2025-01-02"),
            tx("t3", 300.0, "GROCERIES", "2025-01-08"),
            tx("t4", 16.0, "ENTERTAINMENT", "2025-01-10"),
            tx("t5", -3000.0, "INCOME", "2025-02-01"),
            tx("t6", 350.0, "GROCERIES", "2025-02-08"),
        ],
        accounts: vec![
            account("a1", AccountType::Depository, 4200.0),
            account("a2", AccountType::Credit, 600.0),
        ],
    }
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long merchant name", 10), "a very ...");
}

#[test]
fn test_cmd_classify() {
    let ledger = test_ledger();
    assert!(commands::cmd_classify(&ledger, false).is_ok());
    assert!(commands::cmd_classify(&ledger, true).is_ok());
}

#[test]
fn test_cmd_snapshot() {
    let ledger = test_ledger();
    assert!(commands::cmd_snapshot(&ledger, false).is_ok());
    assert!(commands::cmd_snapshot(&ledger, true).is_ok());
}

#[test]
fn test_cmd_snapshot_empty_ledger() {
    let ledger = Ledger::default();
    assert!(commands::cmd_snapshot(&ledger, false).is_ok());
}

#[test]
fn test_cmd_metrics_and_trend() {
    let ledger = test_ledger();
    assert!(commands::cmd_metrics(&ledger, false).is_ok());
    assert!(commands::cmd_trend(&ledger, false).is_ok());
    assert!(commands::cmd_trend(&ledger, true).is_ok());
}

#[test]
fn test_cmd_categories() {
    let ledger = test_ledger();
    assert!(commands::cmd_categories(&ledger, false).is_ok());
}

#[test]
fn test_cmd_statement() {
    let ledger = test_ledger();
    assert!(commands::cmd_statement(&ledger, Some("2025-01"), Some("2025-03"), false).is_ok());
    assert!(commands::cmd_statement(&ledger, Some("2025-01"), Some("2025-03"), true).is_ok());
}

#[test]
fn test_cmd_statement_default_window() {
    // No explicit months: six months ending with the current one
    let ledger = test_ledger();
    assert!(commands::cmd_statement(&ledger, None, None, false).is_ok());
}

#[test]
fn test_cmd_statement_rejects_bad_months() {
    let ledger = test_ledger();
    assert!(commands::cmd_statement(&ledger, Some("January"), Some("2025-03"), false).is_err());
    assert!(commands::cmd_statement(&ledger, Some("2025-04"), Some("2025-01"), false).is_err());
}

#[test]
fn test_cmd_balance_sheet() {
    let ledger = test_ledger();
    assert!(commands::cmd_balance_sheet(&ledger, false).is_ok());
    assert!(commands::cmd_balance_sheet(&ledger, true).is_ok());
}

#[test]
fn test_load_ledger_round_trip() {
    let ledger = test_ledger();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&ledger).unwrap().as_bytes())
        .unwrap();

    let loaded = commands::load_ledger(file.path()).unwrap();
    assert_eq!(loaded.transactions.len(), ledger.transactions.len());
    assert_eq!(loaded.accounts.len(), ledger.accounts.len());
}

#[test]
fn test_load_ledger_missing_file() {
    let result = commands::load_ledger(std::path::Path::new("/nonexistent/ledger.json"));
    assert!(result.is_err());
}

#[test]
fn test_load_ledger_rejects_bad_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{not json").unwrap();
    assert!(commands::load_ledger(file.path()).is_err());
}
