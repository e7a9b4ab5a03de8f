//! Tally Core Library
//!
//! The analytical core of the Tally personal finance tool:
//! - Category taxonomy tables mapping raw aggregator codes to economic buckets
//! - Rule-based transaction classifier (income, expenses, transfers, card payments)
//! - Spending snapshots with recurring-charge detection
//! - Cash-flow metrics and month-over-month trend analysis
//! - Multi-month financial statements and the balance sheet
//!
//! The engine is purely computational: it consumes plain transaction and
//! account records, performs no I/O, and returns newly allocated results.
//! Concurrent callers may share it freely.

pub mod classify;
pub mod error;
pub mod metrics;
pub mod models;
pub mod snapshot;
pub mod statement;
pub mod taxonomy;

pub use classify::{ClassificationSummary, ClassifierConfig, TransactionClassifier};
pub use error::{Error, Result};
pub use metrics::{
    CategoryBreakdown, CategorySpend, FinancialMetrics, MetricsEngine, MomChange,
    MonthlyCashFlow, TrendDirection, TrendMetrics,
};
pub use models::{
    Account, AccountType, Classification, ClassifiedTransaction, Ledger, MonthKey, PaymentMeta,
    Transaction,
};
pub use snapshot::{
    CategorySummary, DateRange, FinancialSnapshot, Frequency, MerchantSummary, RecurringCharge,
    SnapshotAnalyzer,
};
pub use statement::{
    build_balance_sheet, AccountBalance, BalanceSheet, CategoryDetail, FinancialStatement,
    MonthlyFinancials, StatementBuilder, StatementSummary,
};
