//! Category taxonomy tables
//!
//! Maps raw aggregator category codes to economic buckets and statement line
//! items, and holds the keyword tables used for credit-card payment
//! detection. The tables are plain data on an injectable struct so tests can
//! substitute synthetic taxonomies; `Default` builds the shipped tables.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Essential statement line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EssentialLine {
    Housing,
    Utilities,
    Groceries,
    Transportation,
    Healthcare,
    Insurance,
    Other,
}

impl EssentialLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Groceries => "groceries",
            Self::Transportation => "transportation",
            Self::Healthcare => "healthcare",
            Self::Insurance => "insurance",
            Self::Other => "other",
        }
    }
}

/// Discretionary statement line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscretionaryLine {
    Dining,
    Entertainment,
    Shopping,
    Subscriptions,
    Travel,
    Other,
}

impl DiscretionaryLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dining => "dining",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Subscriptions => "subscriptions",
            Self::Travel => "travel",
            Self::Other => "other",
        }
    }
}

/// Lookup tables consumed by the classifier, snapshot analyzer, and
/// statement builder
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    income: HashSet<&'static str>,
    transfer: HashSet<&'static str>,
    /// Essential set used by the classifier
    essential: HashSet<&'static str>,
    /// Broader essential set used by the snapshot's discretionary ratio.
    /// Kept distinct from `essential` on purpose: unifying the two would
    /// change the ratio reading downstream consumers already depend on.
    snapshot_essential: HashSet<&'static str>,
    /// Categories that behave like subscriptions for the snapshot's
    /// subscription-load figure
    subscription_like: HashSet<&'static str>,
    essential_lines: HashMap<&'static str, EssentialLine>,
    discretionary_lines: HashMap<&'static str, DiscretionaryLine>,
    payment_keywords: Regex,
    card_issuers: Regex,
}

const INCOME_CATEGORIES: &[&str] = &[
    "INCOME",
    "INCOME_WAGES",
    "INCOME_DIVIDENDS",
    "INCOME_INTEREST_EARNED",
    "INCOME_RETIREMENT_PENSION",
    "PAYROLL",
];

const TRANSFER_CATEGORIES: &[&str] = &["TRANSFER", "TRANSFER_IN", "TRANSFER_OUT"];

const ESSENTIAL_CATEGORIES: &[&str] = &[
    "RENT",
    "MORTGAGE",
    "RENT_AND_UTILITIES",
    "UTILITIES",
    "GROCERIES",
    "TRANSPORTATION",
    "GAS",
    "MEDICAL",
    "HEALTHCARE",
    "PHARMACY",
    "INSURANCE",
    "LOAN_PAYMENTS",
    "CHILDCARE",
];

// Extra categories the snapshot's discretionary ratio treats as essential,
// on top of ESSENTIAL_CATEGORIES.
const SNAPSHOT_ESSENTIAL_EXTRA: &[&str] = &[
    "BANK_FEES",
    "EDUCATION",
    "PHONE",
    "INTERNET",
    "TELECOM",
    "GOVERNMENT_AND_NON_PROFIT",
];

const SUBSCRIPTION_CATEGORIES: &[&str] =
    &["ENTERTAINMENT", "GENERAL_SERVICES", "SUBSCRIPTION", "STREAMING"];

const ESSENTIAL_LINES: &[(&str, EssentialLine)] = &[
    ("RENT", EssentialLine::Housing),
    ("MORTGAGE", EssentialLine::Housing),
    ("RENT_AND_UTILITIES", EssentialLine::Housing),
    ("UTILITIES", EssentialLine::Utilities),
    ("PHONE", EssentialLine::Utilities),
    ("INTERNET", EssentialLine::Utilities),
    ("TELECOM", EssentialLine::Utilities),
    ("GROCERIES", EssentialLine::Groceries),
    ("TRANSPORTATION", EssentialLine::Transportation),
    ("GAS", EssentialLine::Transportation),
    ("MEDICAL", EssentialLine::Healthcare),
    ("HEALTHCARE", EssentialLine::Healthcare),
    ("PHARMACY", EssentialLine::Healthcare),
    ("INSURANCE", EssentialLine::Insurance),
];

const DISCRETIONARY_LINES: &[(&str, DiscretionaryLine)] = &[
    ("FOOD_AND_DRINK", DiscretionaryLine::Dining),
    ("RESTAURANTS", DiscretionaryLine::Dining),
    ("DINING", DiscretionaryLine::Dining),
    ("COFFEE", DiscretionaryLine::Dining),
    ("ENTERTAINMENT", DiscretionaryLine::Entertainment),
    ("RECREATION", DiscretionaryLine::Entertainment),
    ("GENERAL_MERCHANDISE", DiscretionaryLine::Shopping),
    ("SHOPPING", DiscretionaryLine::Shopping),
    ("CLOTHING", DiscretionaryLine::Shopping),
    ("ELECTRONICS", DiscretionaryLine::Shopping),
    ("GENERAL_SERVICES", DiscretionaryLine::Subscriptions),
    ("SUBSCRIPTION", DiscretionaryLine::Subscriptions),
    ("STREAMING", DiscretionaryLine::Subscriptions),
    ("TRAVEL", DiscretionaryLine::Travel),
    ("AIRLINES", DiscretionaryLine::Travel),
    ("LODGING", DiscretionaryLine::Travel),
];

// Merchant text that marks a transaction as a likely card payment.
const PAYMENT_KEYWORD_PATTERN: &str =
    r"(?i)payment|autopay|credit card|card payment|bill pay|minimum payment|statement balance";

// Major card issuers recognized even when the user has not linked the
// corresponding credit account.
const CARD_ISSUER_PATTERN: &str = r"(?i)chase|amex|american express|citi|capital one|discover|wells fargo|bank of america|barclays|synchrony|apple card|goldman sachs";

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        let mut snapshot_essential: HashSet<&'static str> =
            ESSENTIAL_CATEGORIES.iter().copied().collect();
        snapshot_essential.extend(SNAPSHOT_ESSENTIAL_EXTRA.iter().copied());

        Self {
            income: INCOME_CATEGORIES.iter().copied().collect(),
            transfer: TRANSFER_CATEGORIES.iter().copied().collect(),
            essential: ESSENTIAL_CATEGORIES.iter().copied().collect(),
            snapshot_essential,
            subscription_like: SUBSCRIPTION_CATEGORIES.iter().copied().collect(),
            essential_lines: ESSENTIAL_LINES.iter().copied().collect(),
            discretionary_lines: DISCRETIONARY_LINES.iter().copied().collect(),
            payment_keywords: Regex::new(PAYMENT_KEYWORD_PATTERN)
                .expect("static pattern is valid"),
            card_issuers: Regex::new(CARD_ISSUER_PATTERN).expect("static pattern is valid"),
        }
    }
}

impl CategoryTaxonomy {
    pub fn is_income(&self, category: &str) -> bool {
        self.income.contains(category.to_uppercase().as_str())
    }

    pub fn is_transfer(&self, category: &str) -> bool {
        self.transfer.contains(category.to_uppercase().as_str())
    }

    pub fn is_essential(&self, category: &str) -> bool {
        self.essential.contains(category.to_uppercase().as_str())
    }

    pub fn is_snapshot_essential(&self, category: &str) -> bool {
        self.snapshot_essential
            .contains(category.to_uppercase().as_str())
    }

    pub fn is_subscription_like(&self, category: &str) -> bool {
        self.subscription_like
            .contains(category.to_uppercase().as_str())
    }

    /// Statement line for an essential expense, "other" when unmapped
    pub fn essential_line(&self, category: &str) -> EssentialLine {
        self.essential_lines
            .get(category.to_uppercase().as_str())
            .copied()
            .unwrap_or(EssentialLine::Other)
    }

    /// Statement line for a discretionary expense, "other" when unmapped
    pub fn discretionary_line(&self, category: &str) -> DiscretionaryLine {
        self.discretionary_lines
            .get(category.to_uppercase().as_str())
            .copied()
            .unwrap_or(DiscretionaryLine::Other)
    }

    pub fn mentions_payment_keyword(&self, text: &str) -> bool {
        self.payment_keywords.is_match(text)
    }

    pub fn mentions_card_issuer(&self, text: &str) -> bool {
        self.card_issuers.is_match(text)
    }
}
