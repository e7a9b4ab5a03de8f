//! Cash-flow metrics and trend analysis
//!
//! Everything here routes through the classifier first and only counts
//! cash-flow-relevant transactions: internal transfers, credit-card
//! payments, and excluded rows never reach a total.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::classify::TransactionClassifier;
use crate::models::{Account, Classification, ClassifiedTransaction, MonthKey, Transaction};

/// Percentage band inside which a month-over-month move counts as stable
const STABILITY_THRESHOLD_PERCENT: f64 = 5.0;

/// Window for the trailing cash-flow average, in months
const MOVING_AVERAGE_MONTHS: usize = 3;

/// Headline income/expense figures for a period
#[derive(Debug, Clone, Serialize)]
pub struct FinancialMetrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    /// Net cash flow as a share of income, 0 when there is no income
    pub savings_rate: f64,
    /// Distinct calendar months present in the data, minimum 1
    pub period_months: usize,
}

/// One calendar month of aggregated cash flow
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCashFlow {
    pub month: MonthKey,
    pub income: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
}

/// Direction of the month-over-month cash-flow move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl std::str::FromStr for TrendDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "improving" => Ok(Self::Improving),
            "declining" => Ok(Self::Declining),
            "stable" => Ok(Self::Stable),
            _ => Err(format!("Unknown trend direction: {}", s)),
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Month-over-month net cash-flow comparison
#[derive(Debug, Clone, Serialize)]
pub struct MomChange {
    pub previous: f64,
    pub current: f64,
    pub percentage_change: f64,
}

/// Trend view over the monthly cash-flow series
#[derive(Debug, Clone, Serialize)]
pub struct TrendMetrics {
    pub direction: TrendDirection,
    /// Absent with fewer than two months of data
    pub mom_change: Option<MomChange>,
    /// Mean net cash flow over the last three (or fewer) months
    pub three_month_average: f64,
    pub monthly: Vec<MonthlyCashFlow>,
}

/// One raw expense category, ranked by total spend
#[derive(Debug, Clone, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
    pub transaction_count: usize,
    pub rank: usize,
    pub percent_of_expenses: f64,
    pub percent_of_income: f64,
    /// Month-over-month change in this category's spend, 0 with fewer than
    /// two months of data
    pub mom_change: f64,
}

/// Ranked expense categories for a period
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategorySpend>,
    pub total_expenses: f64,
    pub total_income: f64,
}

/// Computes classified cash-flow metrics and trends
pub struct MetricsEngine {
    classifier: TransactionClassifier,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self {
            classifier: TransactionClassifier::new(),
        }
    }

    pub fn with_classifier(classifier: TransactionClassifier) -> Self {
        Self { classifier }
    }

    fn cash_flow_relevant(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> Vec<ClassifiedTransaction> {
        self.classifier
            .classify_all(transactions, accounts)
            .into_iter()
            .filter(|ct| ct.classification.is_cash_flow_relevant())
            .collect()
    }

    /// Headline metrics over the whole input
    pub fn compute_metrics(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> FinancialMetrics {
        let relevant = self.cash_flow_relevant(transactions, accounts);

        let total_income: f64 = relevant
            .iter()
            .filter(|ct| ct.classification == Classification::Income)
            .map(|ct| ct.transaction.abs_amount())
            .sum();
        let total_expenses: f64 = relevant
            .iter()
            .filter(|ct| ct.classification.is_expense())
            .map(|ct| ct.transaction.amount)
            .sum();
        let net_cash_flow = total_income - total_expenses;

        let months: std::collections::BTreeSet<MonthKey> = relevant
            .iter()
            .map(|ct| MonthKey::from_date(ct.transaction.date))
            .collect();

        debug!(
            income = total_income,
            expenses = total_expenses,
            months = months.len(),
            "metrics computed"
        );

        FinancialMetrics {
            total_income,
            total_expenses,
            net_cash_flow,
            savings_rate: savings_rate(net_cash_flow, total_income),
            period_months: months.len().max(1),
        }
    }

    /// Cash flow bucketed per calendar month, ascending
    pub fn monthly_cash_flows(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> Vec<MonthlyCashFlow> {
        let relevant = self.cash_flow_relevant(transactions, accounts);

        let mut by_month: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();
        for ct in &relevant {
            let entry = by_month
                .entry(MonthKey::from_date(ct.transaction.date))
                .or_insert((0.0, 0.0));
            match ct.classification {
                Classification::Income => entry.0 += ct.transaction.abs_amount(),
                c if c.is_expense() => entry.1 += ct.transaction.amount,
                _ => {}
            }
        }

        by_month
            .into_iter()
            .map(|(month, (income, expenses))| MonthlyCashFlow {
                month,
                income,
                expenses,
                net_cash_flow: income - expenses,
            })
            .collect()
    }

    /// Month-over-month trend over the cash-flow series
    pub fn compute_trend(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> TrendMetrics {
        let monthly = self.monthly_cash_flows(transactions, accounts);

        let mom_change = match monthly.as_slice() {
            [.., previous, current] => Some(MomChange {
                previous: previous.net_cash_flow,
                current: current.net_cash_flow,
                percentage_change: percentage_change(
                    previous.net_cash_flow,
                    current.net_cash_flow,
                ),
            }),
            _ => None,
        };

        let direction = match &mom_change {
            Some(change) if change.percentage_change > STABILITY_THRESHOLD_PERCENT => {
                TrendDirection::Improving
            }
            Some(change) if change.percentage_change < -STABILITY_THRESHOLD_PERCENT => {
                TrendDirection::Declining
            }
            _ => TrendDirection::Stable,
        };

        let tail = &monthly[monthly.len().saturating_sub(MOVING_AVERAGE_MONTHS)..];
        let three_month_average = if tail.is_empty() {
            0.0
        } else {
            tail.iter().map(|m| m.net_cash_flow).sum::<f64>() / tail.len() as f64
        };

        TrendMetrics {
            direction,
            mom_change,
            three_month_average,
            monthly,
        }
    }

    /// Expense-only aggregation by raw category, ranked by total spend
    pub fn category_breakdown(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> CategoryBreakdown {
        let relevant = self.cash_flow_relevant(transactions, accounts);

        let total_income: f64 = relevant
            .iter()
            .filter(|ct| ct.classification == Classification::Income)
            .map(|ct| ct.transaction.abs_amount())
            .sum();

        let expenses: Vec<&ClassifiedTransaction> = relevant
            .iter()
            .filter(|ct| ct.classification.is_expense())
            .collect();
        let total_expenses: f64 = expenses.iter().map(|ct| ct.transaction.amount).sum();

        let months: std::collections::BTreeSet<MonthKey> = expenses
            .iter()
            .map(|ct| MonthKey::from_date(ct.transaction.date))
            .collect();
        // A single month can never show a trend; compare the two most
        // recent months present otherwise.
        let recent_pair = if months.len() >= 2 {
            let mut iter = months.iter().rev();
            let current = *iter.next().expect("len checked");
            let previous = *iter.next().expect("len checked");
            Some((previous, current))
        } else {
            None
        };

        let mut by_category: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        let mut by_category_month: BTreeMap<(String, MonthKey), f64> = BTreeMap::new();
        for ct in &expenses {
            let key = match ct.transaction.category.as_deref() {
                Some(c) if !c.is_empty() => c.to_uppercase(),
                _ => "UNCATEGORIZED".to_string(),
            };
            let entry = by_category.entry(key.clone()).or_insert((0.0, 0));
            entry.0 += ct.transaction.amount;
            entry.1 += 1;
            *by_category_month
                .entry((key, MonthKey::from_date(ct.transaction.date)))
                .or_insert(0.0) += ct.transaction.amount;
        }

        let mut categories: Vec<CategorySpend> = by_category
            .into_iter()
            .map(|(category, (total, transaction_count))| {
                let mom_change = match recent_pair {
                    Some((previous, current)) => {
                        let prev = by_category_month
                            .get(&(category.clone(), previous))
                            .copied()
                            .unwrap_or(0.0);
                        let cur = by_category_month
                            .get(&(category.clone(), current))
                            .copied()
                            .unwrap_or(0.0);
                        percentage_change(prev, cur)
                    }
                    None => 0.0,
                };
                CategorySpend {
                    category,
                    total,
                    transaction_count,
                    rank: 0,
                    percent_of_expenses: percent_of(total, total_expenses),
                    percent_of_income: percent_of(total, total_income),
                    mom_change,
                }
            })
            .collect();

        categories.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        for (index, category) in categories.iter_mut().enumerate() {
            category.rank = index + 1;
        }

        CategoryBreakdown {
            categories,
            total_expenses,
            total_income,
        }
    }
}

fn savings_rate(net_cash_flow: f64, income: f64) -> f64 {
    if income > 0.0 {
        net_cash_flow / income * 100.0
    } else {
        0.0
    }
}

fn percent_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}

/// Percentage change from `previous` to `current`. A move away from an
/// exactly-zero base reads as a full swing in its direction.
fn percentage_change(previous: f64, current: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous.abs() * 100.0
    } else if current > 0.0 {
        100.0
    } else if current < 0.0 {
        -100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, PaymentMeta};

    fn account(id: &str, account_type: AccountType) -> Account {
        Account {
            id: id.to_string(),
            name: format!("{} account", id),
            account_type,
            subtype: None,
            balance: Some(0.0),
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
            category: if category.is_empty() {
                None
            } else {
                Some(category.to_string())
            },
            pending: false,
            account_id: "a1".to_string(),
            transaction_code: None,
            payment_channel: None,
            payment_meta: None,
        }
    }

    #[test]
    fn test_core_metrics() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![
            tx("t1", -3000.0, "INCOME", "2025-01-01"),
            tx("t2", 1000.0, "GROCERIES", "2025-01-10"),
            tx("t3", 500.0, "ENTERTAINMENT", "2025-01-15"),
        ];

        let metrics = engine.compute_metrics(&transactions, &accounts);
        assert_eq!(metrics.total_income, 3000.0);
        assert_eq!(metrics.total_expenses, 1500.0);
        assert_eq!(metrics.net_cash_flow, 1500.0);
        assert_eq!(metrics.savings_rate, 50.0);
        assert_eq!(metrics.period_months, 1);
    }

    #[test]
    fn test_zero_income_savings_rate() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![tx("t1", 100.0, "GROCERIES", "2025-01-10")];

        let metrics = engine.compute_metrics(&transactions, &accounts);
        assert_eq!(metrics.savings_rate, 0.0);
        assert_eq!(metrics.period_months, 1);
    }

    #[test]
    fn test_empty_input_yields_zero_metrics() {
        let engine = MetricsEngine::new();
        let metrics = engine.compute_metrics(&[], &[]);
        assert_eq!(metrics.total_income, 0.0);
        assert_eq!(metrics.total_expenses, 0.0);
        assert_eq!(metrics.net_cash_flow, 0.0);
        assert_eq!(metrics.period_months, 1);
    }

    #[test]
    fn test_transfers_do_not_reach_totals() {
        let engine = MetricsEngine::new();
        let accounts = [
            account("a1", AccountType::Depository),
            account("a2", AccountType::Depository),
        ];
        let mut out_leg = tx("t1", 500.0, "", "2025-01-10");
        out_leg.transaction_code = Some("transfer".to_string());
        let mut in_leg = tx("t2", -500.0, "", "2025-01-11");
        in_leg.account_id = "a2".to_string();
        in_leg.transaction_code = Some("transfer".to_string());
        let transactions = vec![
            tx("t3", -2000.0, "INCOME", "2025-01-01"),
            tx("t4", 300.0, "GROCERIES", "2025-01-05"),
            out_leg,
            in_leg,
        ];

        let metrics = engine.compute_metrics(&transactions, &accounts);
        assert_eq!(metrics.total_income, 2000.0);
        assert_eq!(metrics.total_expenses, 300.0);
    }

    #[test]
    fn test_monthly_cash_flows_ascending() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![
            tx("t1", 200.0, "GROCERIES", "2025-02-10"),
            tx("t2", -1000.0, "INCOME", "2025-01-01"),
            tx("t3", 100.0, "GROCERIES", "2025-01-10"),
        ];

        let monthly = engine.monthly_cash_flows(&transactions, &accounts);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month.to_string(), "2025-01");
        assert_eq!(monthly[0].net_cash_flow, 900.0);
        assert_eq!(monthly[1].month.to_string(), "2025-02");
        assert_eq!(monthly[1].net_cash_flow, -200.0);
    }

    #[test]
    fn test_trend_from_zero_base_is_full_swing() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        // January nets exactly zero, February nets +300
        let transactions = vec![
            tx("t1", -100.0, "INCOME", "2025-01-05"),
            tx("t2", 100.0, "GROCERIES", "2025-01-10"),
            tx("t3", -300.0, "INCOME", "2025-02-05"),
        ];

        let trend = engine.compute_trend(&transactions, &accounts);
        assert_eq!(trend.direction, TrendDirection::Improving);
        let change = trend.mom_change.unwrap();
        assert_eq!(change.percentage_change, 100.0);
    }

    #[test]
    fn test_trend_stability_band() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        // +1000 then +1030: a 3% move stays stable
        let transactions = vec![
            tx("t1", -1000.0, "INCOME", "2025-01-05"),
            tx("t2", -1030.0, "INCOME", "2025-02-05"),
        ];
        let trend = engine.compute_trend(&transactions, &accounts);
        assert_eq!(trend.direction, TrendDirection::Stable);

        // +1000 then +500 is a decline
        let transactions = vec![
            tx("t1", -1000.0, "INCOME", "2025-01-05"),
            tx("t2", -500.0, "INCOME", "2025-02-05"),
        ];
        let trend = engine.compute_trend(&transactions, &accounts);
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert_eq!(trend.mom_change.unwrap().percentage_change, -50.0);
    }

    #[test]
    fn test_single_month_is_stable_with_no_mom() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![tx("t1", -1000.0, "INCOME", "2025-01-05")];

        let trend = engine.compute_trend(&transactions, &accounts);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(trend.mom_change.is_none());
        assert_eq!(trend.three_month_average, 1000.0);
    }

    #[test]
    fn test_three_month_average_uses_last_window() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![
            tx("t1", -100.0, "INCOME", "2025-01-05"),
            tx("t2", -200.0, "INCOME", "2025-02-05"),
            tx("t3", -300.0, "INCOME", "2025-03-05"),
            tx("t4", -400.0, "INCOME", "2025-04-05"),
        ];

        let trend = engine.compute_trend(&transactions, &accounts);
        assert_eq!(trend.three_month_average, 300.0);
    }

    #[test]
    fn test_category_breakdown_ranking() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![
            tx("t1", -2000.0, "INCOME", "2025-01-01"),
            tx("t2", 600.0, "GROCERIES", "2025-01-05"),
            tx("t3", 150.0, "ENTERTAINMENT", "2025-01-08"),
            tx("t4", 250.0, "GROCERIES", "2025-01-20"),
        ];

        let breakdown = engine.category_breakdown(&transactions, &accounts);
        assert_eq!(breakdown.total_expenses, 1000.0);
        assert_eq!(breakdown.total_income, 2000.0);
        assert_eq!(breakdown.categories.len(), 2);

        let first = &breakdown.categories[0];
        assert_eq!(first.category, "GROCERIES");
        assert_eq!(first.rank, 1);
        assert_eq!(first.total, 850.0);
        assert_eq!(first.transaction_count, 2);
        assert_eq!(first.percent_of_expenses, 85.0);
        assert_eq!(first.percent_of_income, 42.5);
        // Single month of data: no trend
        assert_eq!(first.mom_change, 0.0);
    }

    #[test]
    fn test_category_mom_change_across_months() {
        let engine = MetricsEngine::new();
        let accounts = [account("a1", AccountType::Depository)];
        let transactions = vec![
            tx("t1", 100.0, "GROCERIES", "2025-01-05"),
            tx("t2", 150.0, "GROCERIES", "2025-02-05"),
            tx("t3", 80.0, "ENTERTAINMENT", "2025-02-10"),
        ];

        let breakdown = engine.category_breakdown(&transactions, &accounts);
        let groceries = breakdown
            .categories
            .iter()
            .find(|c| c.category == "GROCERIES")
            .unwrap();
        assert_eq!(groceries.mom_change, 50.0);

        // New this month: full positive swing from a zero base
        let entertainment = breakdown
            .categories
            .iter()
            .find(|c| c.category == "ENTERTAINMENT")
            .unwrap();
        assert_eq!(entertainment.mom_change, 100.0);
    }

    #[test]
    fn test_partition_property() {
        let engine = MetricsEngine::new();
        let classifier = TransactionClassifier::new();
        let accounts = [
            account("a1", AccountType::Depository),
            account("a2", AccountType::Depository),
        ];
        let mut pending = tx("t5", 42.0, "SHOPPING", "2025-01-20");
        pending.pending = true;
        let mut out_leg = tx("t3", 500.0, "", "2025-01-10");
        out_leg.transaction_code = Some("transfer".to_string());
        let mut in_leg = tx("t4", -500.0, "", "2025-01-11");
        in_leg.account_id = "a2".to_string();
        in_leg.transaction_code = Some("transfer".to_string());
        let mut card_payment = tx("t6", 200.0, "", "2025-01-15");
        card_payment.name = "CHASE CREDIT CARD PAYMENT".to_string();
        card_payment.payment_meta = Some(PaymentMeta::default());
        let transactions = vec![
            tx("t1", -2000.0, "INCOME", "2025-01-01"),
            tx("t2", 300.0, "GROCERIES", "2025-01-05"),
            out_leg,
            in_leg,
            pending,
            card_payment,
        ];

        let all = classifier.classify_all(&transactions, &accounts);
        let excluded_count = all
            .iter()
            .filter(|ct| !ct.classification.is_cash_flow_relevant())
            .count();
        let relevant_count = engine.cash_flow_relevant(&transactions, &accounts).len();
        assert_eq!(relevant_count, all.len() - excluded_count);
        assert_eq!(excluded_count, 4);
    }
}
