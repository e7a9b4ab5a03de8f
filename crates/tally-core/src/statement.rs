//! Financial statement assembly
//!
//! Buckets classified transactions into a gapless calendar-month grid of
//! income, essential and discretionary expenses, and transfer totals, then
//! derives per-month net cash flow and savings rate plus summary averages.
//! Also builds the point-in-time balance sheet from account balances.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::classify::TransactionClassifier;
use crate::error::{Error, Result};
use crate::models::{Account, AccountType, Classification, MonthKey, Transaction};
use crate::taxonomy::{CategoryTaxonomy, DiscretionaryLine, EssentialLine};

/// Income for one month, split by source
#[derive(Debug, Clone, Default, Serialize)]
pub struct IncomeSection {
    pub salary: f64,
    pub investment: f64,
    pub other: f64,
    pub total: f64,
}

/// Essential expenses for one month
#[derive(Debug, Clone, Default, Serialize)]
pub struct EssentialSection {
    pub housing: f64,
    pub utilities: f64,
    pub groceries: f64,
    pub transportation: f64,
    pub healthcare: f64,
    pub insurance: f64,
    pub other: f64,
    pub total: f64,
}

impl EssentialSection {
    fn add(&mut self, line: EssentialLine, amount: f64) {
        match line {
            EssentialLine::Housing => self.housing += amount,
            EssentialLine::Utilities => self.utilities += amount,
            EssentialLine::Groceries => self.groceries += amount,
            EssentialLine::Transportation => self.transportation += amount,
            EssentialLine::Healthcare => self.healthcare += amount,
            EssentialLine::Insurance => self.insurance += amount,
            EssentialLine::Other => self.other += amount,
        }
        self.total += amount;
    }
}

/// Discretionary expenses for one month
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscretionarySection {
    pub dining: f64,
    pub entertainment: f64,
    pub shopping: f64,
    pub subscriptions: f64,
    pub travel: f64,
    pub other: f64,
    pub total: f64,
}

impl DiscretionarySection {
    fn add(&mut self, line: DiscretionaryLine, amount: f64) {
        match line {
            DiscretionaryLine::Dining => self.dining += amount,
            DiscretionaryLine::Entertainment => self.entertainment += amount,
            DiscretionaryLine::Shopping => self.shopping += amount,
            DiscretionaryLine::Subscriptions => self.subscriptions += amount,
            DiscretionaryLine::Travel => self.travel += amount,
            DiscretionaryLine::Other => self.other += amount,
        }
        self.total += amount;
    }
}

/// Money moved between the user's own accounts in one month; excluded from
/// income and expense totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferSection {
    pub internal: f64,
    pub credit_card_payments: f64,
}

/// One calendar month of the statement grid
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyFinancials {
    pub month: MonthKey,
    pub income: IncomeSection,
    pub essential: EssentialSection,
    pub discretionary: DiscretionarySection,
    pub transfers: TransferSection,
    pub net_cash_flow: f64,
    pub savings_rate: f64,
}

impl MonthlyFinancials {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            income: IncomeSection::default(),
            essential: EssentialSection::default(),
            discretionary: DiscretionarySection::default(),
            transfers: TransferSection::default(),
            net_cash_flow: 0.0,
            savings_rate: 0.0,
        }
    }

    pub fn total_expenses(&self) -> f64 {
        self.essential.total + self.discretionary.total
    }
}

/// Averages and totals across the statement's months
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatementSummary {
    pub average_monthly_income: f64,
    pub average_monthly_expenses: f64,
    pub average_savings_rate: f64,
    pub total_net_savings: f64,
}

/// Absolute spend for one raw category, month by month, aligned with the
/// statement's month order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    pub category: String,
    pub by_month: Vec<f64>,
    pub total: f64,
}

/// Multi-month financial statement
#[derive(Debug, Clone, Serialize)]
pub struct FinancialStatement {
    pub months: Vec<MonthlyFinancials>,
    pub summary: StatementSummary,
    pub category_detail: Vec<CategoryDetail>,
}

/// Balance of a single account inside the balance sheet
#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub institution: Option<String>,
    pub balance: f64,
}

/// Point-in-time snapshot of assets and liabilities, from current account
/// balances only
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub as_of: DateTime<Utc>,
    pub liquid_assets: f64,
    pub credit_card_debt: f64,
    pub net_worth: f64,
    pub assets: Vec<AccountBalance>,
    pub liabilities: Vec<AccountBalance>,
}

/// Builds multi-month statements from classified transactions
pub struct StatementBuilder {
    classifier: TransactionClassifier,
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self {
            classifier: TransactionClassifier::new(),
        }
    }

    pub fn with_taxonomy(taxonomy: CategoryTaxonomy) -> Self {
        Self {
            classifier: TransactionClassifier::with_taxonomy(taxonomy),
        }
    }

    /// Build the statement for every month from `start` to `end` inclusive.
    /// Months without transactions appear as all-zero rows; transactions
    /// outside the range are silently skipped. Errors only when the range is
    /// inverted.
    pub fn build(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
        start: MonthKey,
        end: MonthKey,
    ) -> Result<FinancialStatement> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }

        let keys = MonthKey::range(start, end);
        let index: HashMap<MonthKey, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, &key)| (key, i))
            .collect();
        let mut months: Vec<MonthlyFinancials> =
            keys.iter().map(|&key| MonthlyFinancials::empty(key)).collect();
        let mut detail: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        let taxonomy = self.classifier.taxonomy();
        for ct in self.classifier.classify_all(transactions, accounts) {
            let Some(&slot) = index.get(&MonthKey::from_date(ct.transaction.date)) else {
                continue;
            };
            let month = &mut months[slot];
            let tx = &ct.transaction;
            let amount = tx.abs_amount();

            match ct.classification {
                Classification::Excluded => {}
                Classification::Income => {
                    match income_line(tx) {
                        IncomeLine::Salary => month.income.salary += amount,
                        IncomeLine::Investment => month.income.investment += amount,
                        IncomeLine::Other => month.income.other += amount,
                    }
                    month.income.total += amount;
                }
                Classification::ExpenseEssential => {
                    month
                        .essential
                        .add(taxonomy.essential_line(tx.category_code()), amount);
                    record_detail(&mut detail, tx, amount, keys.len(), slot);
                }
                Classification::ExpenseDiscretionary => {
                    month
                        .discretionary
                        .add(taxonomy.discretionary_line(tx.category_code()), amount);
                    record_detail(&mut detail, tx, amount, keys.len(), slot);
                }
                Classification::InternalTransfer => month.transfers.internal += amount,
                Classification::CreditCardPayment => {
                    month.transfers.credit_card_payments += amount
                }
            }
        }

        for month in &mut months {
            month.net_cash_flow = month.income.total - month.total_expenses();
            month.savings_rate = if month.income.total > 0.0 {
                month.net_cash_flow / month.income.total * 100.0
            } else {
                0.0
            };
        }

        let month_count = months.len().max(1) as f64;
        let total_net_savings: f64 = months.iter().map(|m| m.net_cash_flow).sum();
        let summary = StatementSummary {
            average_monthly_income: months.iter().map(|m| m.income.total).sum::<f64>()
                / month_count,
            average_monthly_expenses: months.iter().map(|m| m.total_expenses()).sum::<f64>()
                / month_count,
            average_savings_rate: months.iter().map(|m| m.savings_rate).sum::<f64>()
                / month_count,
            total_net_savings,
        };

        let mut category_detail: Vec<CategoryDetail> = detail
            .into_iter()
            .map(|(category, by_month)| CategoryDetail {
                category,
                total: by_month.iter().sum(),
                by_month,
            })
            .collect();
        category_detail.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        debug!(
            months = months.len(),
            categories = category_detail.len(),
            "statement built"
        );

        Ok(FinancialStatement {
            months,
            summary,
            category_detail,
        })
    }
}

enum IncomeLine {
    Salary,
    Investment,
    Other,
}

fn income_line(tx: &Transaction) -> IncomeLine {
    let category = tx.category_code().to_uppercase();
    if category == "INCOME" || category == "INCOME_WAGES" || category == "PAYROLL" {
        return IncomeLine::Salary;
    }
    let name = tx.name.to_lowercase();
    if name.contains("interest") || name.contains("dividend") {
        return IncomeLine::Investment;
    }
    IncomeLine::Other
}

fn record_detail(
    detail: &mut BTreeMap<String, Vec<f64>>,
    tx: &Transaction,
    amount: f64,
    month_count: usize,
    slot: usize,
) {
    let key = match tx.category.as_deref() {
        Some(c) if !c.is_empty() => c.to_uppercase(),
        _ => "UNCATEGORIZED".to_string(),
    };
    detail.entry(key).or_insert_with(|| vec![0.0; month_count])[slot] += amount;
}

/// Sum depository balances into liquid assets and credit balances into debt.
/// Accounts without a reported balance, and non-depository non-credit types,
/// are left out.
pub fn build_balance_sheet(accounts: &[Account]) -> BalanceSheet {
    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut liquid_assets = 0.0;
    let mut credit_card_debt = 0.0;

    for account in accounts {
        let Some(balance) = account.balance else {
            continue;
        };
        let entry = AccountBalance {
            account_id: account.id.clone(),
            name: account.name.clone(),
            institution: account.institution.clone(),
            balance,
        };
        match account.account_type {
            AccountType::Depository => {
                liquid_assets += balance;
                assets.push(entry);
            }
            AccountType::Credit => {
                credit_card_debt += balance;
                liabilities.push(entry);
            }
            AccountType::Other => {}
        }
    }

    BalanceSheet {
        as_of: Utc::now(),
        liquid_assets,
        credit_card_debt,
        net_worth: liquid_assets - credit_card_debt,
        assets,
        liabilities,
    }
}
