//! Domain models for Tally
//!
//! Input records mirror what the upstream banking aggregator reports; the
//! engine never mutates them. Everything derived (classifications, snapshots,
//! statements) is defined next to the module that computes it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A bank account as reported by the upstream aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub subtype: Option<String>,
    /// Current balance as reported by the institution. Positive for both
    /// asset balances and outstanding credit-card debt.
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub institution: Option<String>,
    /// Groups accounts belonging to the same aggregator connection
    #[serde(default)]
    pub item_id: Option<String>,
}

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Depository,
    Credit,
    /// Anything else the aggregator reports (loan, investment, ...)
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depository => "depository",
            Self::Credit => "credit",
            Self::Other => "other",
        }
    }
}

impl Serialize for AccountType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // Unknown types map to Other rather than failing the whole bundle
        Ok(s.parse().unwrap_or(AccountType::Other))
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "depository" => Ok(Self::Depository),
            "credit" => Ok(Self::Credit),
            _ => Ok(Self::Other),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payee/payer/method hints attached to a transaction by the aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMeta {
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub payer: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    /// Merchant description as reported by the institution
    pub name: String,
    /// Positive = money leaving the user, negative = money arriving.
    /// Sign convention inherited from the upstream aggregator.
    pub amount: f64,
    /// Raw taxonomy code (e.g. "GROCERIES", "INCOME")
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pending: bool,
    pub account_id: String,
    /// Aggregator hint such as "transfer" or "bill_payment"
    #[serde(default)]
    pub transaction_code: Option<String>,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub payment_meta: Option<PaymentMeta>,
}

impl Transaction {
    /// Raw category code, empty string when the aggregator sent none
    pub fn category_code(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}

/// The economic role of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Income,
    ExpenseEssential,
    ExpenseDiscretionary,
    InternalTransfer,
    CreditCardPayment,
    Excluded,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::ExpenseEssential => "expense_essential",
            Self::ExpenseDiscretionary => "expense_discretionary",
            Self::InternalTransfer => "internal_transfer",
            Self::CreditCardPayment => "credit_card_payment",
            Self::Excluded => "excluded",
        }
    }

    /// Whether the transaction counts toward income/expense totals.
    /// Transfers, card payments, and excluded transactions do not.
    pub fn is_cash_flow_relevant(&self) -> bool {
        !matches!(
            self,
            Self::InternalTransfer | Self::CreditCardPayment | Self::Excluded
        )
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Self::ExpenseEssential | Self::ExpenseDiscretionary)
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense_essential" => Ok(Self::ExpenseEssential),
            "expense_discretionary" => Ok(Self::ExpenseDiscretionary),
            "internal_transfer" => Ok(Self::InternalTransfer),
            "credit_card_payment" => Ok(Self::CreditCardPayment),
            "excluded" => Ok(Self::Excluded),
            _ => Err(format!("Unknown classification: {}", s)),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction paired with its classification label
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTransaction {
    pub transaction: Transaction,
    pub classification: Classification,
}

/// A calendar month key ("YYYY-MM") with ordering and iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonthKey(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month immediately after this one
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The month immediately before this one
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// All months from `start` to `end` inclusive. Empty when `end < start`.
    pub fn range(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
        let mut keys = Vec::new();
        let mut current = start;
        while current <= end {
            keys.push(current);
            current = current.next();
        }
        keys
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonthKey(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Everything the engine consumes: the transaction history and account list
/// exported from the upstream aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Ledger {
    /// Parse an aggregator export bundle from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
