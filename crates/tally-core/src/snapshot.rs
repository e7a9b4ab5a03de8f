//! Spending snapshot analysis
//!
//! Computes a point-in-time view of spending behavior over a transaction
//! window: totals, velocity, category breakdown, top merchants, recurring
//! charges, discretionary ratio, and subscription load. Works from raw
//! categories rather than classification labels; it is the behavior view,
//! the metrics engine is the classification-aware view.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::Transaction;
use crate::taxonomy::CategoryTaxonomy;

/// Inclusive date window a snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Spend aggregated under one raw category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Spend aggregated under one normalized merchant
#[derive(Debug, Clone, Serialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub amount: f64,
    pub transaction_count: usize,
}

/// Cadence of a recurring charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Occurrences per year at this cadence
    pub fn annual_multiplier(&self) -> f64 {
        match self {
            Self::Weekly => 52.0,
            Self::Biweekly => 26.0,
            Self::Monthly => 12.0,
            Self::Yearly => 1.0,
        }
    }

    /// Map a mean day-gap to a cadence, None when it fits no band
    fn from_average_gap(gap_days: f64) -> Option<Self> {
        match gap_days {
            g if (25.0..=35.0).contains(&g) => Some(Self::Monthly),
            g if (6.0..=8.0).contains(&g) => Some(Self::Weekly),
            g if (13.0..=16.0).contains(&g) => Some(Self::Biweekly),
            g if (355.0..=375.0).contains(&g) => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A merchant+amount pair recurring at a regular interval
#[derive(Debug, Clone, Serialize)]
pub struct RecurringCharge {
    pub merchant: String,
    /// Average charge amount across occurrences
    pub amount: f64,
    pub frequency: Frequency,
    pub occurrences: usize,
    pub average_interval_days: f64,
    /// Average amount annualized by the cadence multiplier
    pub annual_impact: f64,
}

/// Rolling-window view of spending behavior
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSnapshot {
    pub period: DateRange,
    pub total_spending: f64,
    pub average_daily_spend: f64,
    pub weekly_velocity: f64,
    pub category_breakdown: Vec<CategorySummary>,
    pub top_merchants: Vec<MerchantSummary>,
    pub recurring_charges: Vec<RecurringCharge>,
    /// Share of spending outside the essential set, 0-100
    pub discretionary_ratio: f64,
    pub subscription_load: f64,
}

impl FinancialSnapshot {
    /// Zero-valued snapshot used when the window holds no spending
    fn empty(today: NaiveDate) -> Self {
        Self {
            period: DateRange {
                start: today,
                end: today,
            },
            total_spending: 0.0,
            average_daily_spend: 0.0,
            weekly_velocity: 0.0,
            category_breakdown: Vec::new(),
            top_merchants: Vec::new(),
            recurring_charges: Vec::new(),
            discretionary_ratio: 0.0,
            subscription_load: 0.0,
        }
    }
}

const TOP_MERCHANT_LIMIT: usize = 10;
const RECURRING_MIN_OCCURRENCES: usize = 2;

/// Computes spending snapshots over raw transaction lists
pub struct SnapshotAnalyzer {
    taxonomy: CategoryTaxonomy,
}

impl Default for SnapshotAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotAnalyzer {
    pub fn new() -> Self {
        Self {
            taxonomy: CategoryTaxonomy::default(),
        }
    }

    pub fn with_taxonomy(taxonomy: CategoryTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// Aggregate outbound, non-pending transactions into a snapshot.
    /// Empty input yields a zero-valued snapshot, never an error.
    pub fn analyze(&self, transactions: &[Transaction]) -> FinancialSnapshot {
        let spending: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.amount > 0.0 && !t.pending)
            .collect();

        if spending.is_empty() {
            return FinancialSnapshot::empty(Utc::now().date_naive());
        }

        let start = spending.iter().map(|t| t.date).min().expect("non-empty");
        let end = spending.iter().map(|t| t.date).max().expect("non-empty");
        let days = (end - start).num_days().max(1);

        let total_spending: f64 = spending.iter().map(|t| t.amount).sum();
        let average_daily_spend = total_spending / days as f64;

        let essential_spending: f64 = spending
            .iter()
            .filter(|t| self.taxonomy.is_snapshot_essential(t.category_code()))
            .map(|t| t.amount)
            .sum();
        let subscription_load: f64 = spending
            .iter()
            .filter(|t| self.taxonomy.is_subscription_like(t.category_code()))
            .map(|t| t.amount)
            .sum();

        let snapshot = FinancialSnapshot {
            period: DateRange { start, end },
            total_spending,
            average_daily_spend,
            weekly_velocity: average_daily_spend * 7.0,
            category_breakdown: category_breakdown(&spending, total_spending),
            top_merchants: top_merchants(&spending),
            recurring_charges: detect_recurring_charges(&spending),
            discretionary_ratio: (total_spending - essential_spending) / total_spending * 100.0,
            subscription_load,
        };
        debug!(
            total = snapshot.total_spending,
            categories = snapshot.category_breakdown.len(),
            recurring = snapshot.recurring_charges.len(),
            "snapshot computed"
        );
        snapshot
    }
}

fn category_breakdown(spending: &[&Transaction], total: f64) -> Vec<CategorySummary> {
    let mut by_category: HashMap<String, (f64, usize)> = HashMap::new();
    for tx in spending {
        let key = match tx.category.as_deref() {
            Some(c) if !c.is_empty() => c.to_uppercase(),
            _ => "UNCATEGORIZED".to_string(),
        };
        let entry = by_category.entry(key).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategorySummary> = by_category
        .into_iter()
        .map(|(category, (amount, transaction_count))| CategorySummary {
            category,
            amount,
            percentage: amount / total * 100.0,
            transaction_count,
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    breakdown
}

fn top_merchants(spending: &[&Transaction]) -> Vec<MerchantSummary> {
    let mut by_merchant: HashMap<String, (f64, usize)> = HashMap::new();
    for tx in spending {
        let entry = by_merchant
            .entry(normalize_merchant(&tx.name))
            .or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut merchants: Vec<MerchantSummary> = by_merchant
        .into_iter()
        .map(|(merchant, (amount, transaction_count))| MerchantSummary {
            merchant,
            amount,
            transaction_count,
        })
        .collect();
    merchants.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    merchants.truncate(TOP_MERCHANT_LIMIT);
    merchants
}

/// Group by (normalized merchant, rounded amount) and keep groups whose mean
/// occurrence gap lands in a known cadence band.
fn detect_recurring_charges(spending: &[&Transaction]) -> Vec<RecurringCharge> {
    let mut groups: HashMap<(String, i64), Vec<&Transaction>> = HashMap::new();
    for tx in spending {
        groups
            .entry((normalize_merchant(&tx.name), tx.amount.round() as i64))
            .or_default()
            .push(tx);
    }

    let mut charges = Vec::new();
    for ((merchant, _), mut group) in groups {
        if group.len() < RECURRING_MIN_OCCURRENCES {
            continue;
        }
        group.sort_by_key(|t| t.date);

        let gaps: Vec<i64> = group
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();
        let average_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

        let Some(frequency) = Frequency::from_average_gap(average_gap) else {
            continue;
        };

        let amount = group.iter().map(|t| t.amount).sum::<f64>() / group.len() as f64;
        charges.push(RecurringCharge {
            merchant,
            amount,
            frequency,
            occurrences: group.len(),
            average_interval_days: average_gap,
            annual_impact: amount * frequency.annual_multiplier(),
        });
    }

    charges.sort_by(|a, b| {
        b.annual_impact
            .partial_cmp(&a.annual_impact)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    charges
}

/// Lowercase a merchant description and collapse separator noise so that
/// "NETFLIX.COM*12345" and "netflix.com 12345" group together
fn normalize_merchant(name: &str) -> String {
    name.to_lowercase()
        .replace(['*', '#'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
