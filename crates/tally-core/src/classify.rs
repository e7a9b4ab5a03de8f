//! Transaction classification
//!
//! Assigns each transaction exactly one economic role using amount sign,
//! category, aggregator hints, and cross-transaction matching for internal
//! transfers and credit-card payments. Classification is a pure function of
//! (transaction, full transaction list, account list): no state, no I/O,
//! same inputs always yield the same label.

use serde::Serialize;
use tracing::debug;

use crate::models::{
    Account, AccountType, Classification, ClassifiedTransaction, Transaction,
};
use crate::taxonomy::CategoryTaxonomy;

/// Classifier thresholds
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Max calendar-day gap between the two legs of an internal transfer
    pub transfer_window_days: i64,
    /// Max absolute-amount difference between transfer legs, in currency units
    pub transfer_amount_tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            transfer_window_days: 3,
            transfer_amount_tolerance: 1.0,
        }
    }
}

/// Per-label transaction counts for a classification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub income: usize,
    pub expense_essential: usize,
    pub expense_discretionary: usize,
    pub internal_transfer: usize,
    pub credit_card_payment: usize,
    pub excluded: usize,
}

impl ClassificationSummary {
    pub fn record(&mut self, label: Classification) {
        match label {
            Classification::Income => self.income += 1,
            Classification::ExpenseEssential => self.expense_essential += 1,
            Classification::ExpenseDiscretionary => self.expense_discretionary += 1,
            Classification::InternalTransfer => self.internal_transfer += 1,
            Classification::CreditCardPayment => self.credit_card_payment += 1,
            Classification::Excluded => self.excluded += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.income
            + self.expense_essential
            + self.expense_discretionary
            + self.internal_transfer
            + self.credit_card_payment
            + self.excluded
    }
}

/// Rule-based transaction classifier
pub struct TransactionClassifier {
    taxonomy: CategoryTaxonomy,
    config: ClassifierConfig,
}

impl Default for TransactionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionClassifier {
    pub fn new() -> Self {
        Self {
            taxonomy: CategoryTaxonomy::default(),
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_taxonomy(taxonomy: CategoryTaxonomy) -> Self {
        Self {
            taxonomy,
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(taxonomy: CategoryTaxonomy, config: ClassifierConfig) -> Self {
        Self { taxonomy, config }
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    /// Classify one transaction. Total: every input gets exactly one label,
    /// unknown categories fall through to the discretionary default.
    ///
    /// The ladder, first match wins:
    /// 1. pending -> excluded
    /// 2. internal-transfer test (runs before the sign rule so both legs of
    ///    a matched pair carry the label)
    /// 3. negative amount -> income (inbound, per the aggregator's sign
    ///    convention)
    /// 4. depository-side credit-card payment test
    /// 5. income category set
    /// 6. essential category set
    /// 7. discretionary default
    pub fn classify(
        &self,
        tx: &Transaction,
        all_transactions: &[Transaction],
        accounts: &[Account],
    ) -> Classification {
        if tx.pending {
            return Classification::Excluded;
        }
        if self.is_internal_transfer(tx, all_transactions, accounts) {
            return Classification::InternalTransfer;
        }
        if tx.amount < 0.0 {
            return Classification::Income;
        }
        if self.is_credit_card_payment(tx, accounts) {
            return Classification::CreditCardPayment;
        }

        let category = tx.category_code();
        if self.taxonomy.is_income(category) {
            return Classification::Income;
        }
        if self.taxonomy.is_essential(category) {
            return Classification::ExpenseEssential;
        }
        Classification::ExpenseDiscretionary
    }

    /// Classify every transaction in the list
    pub fn classify_all(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> Vec<ClassifiedTransaction> {
        transactions
            .iter()
            .map(|tx| ClassifiedTransaction {
                classification: self.classify(tx, transactions, accounts),
                transaction: tx.clone(),
            })
            .collect()
    }

    /// Classify every transaction and tally the labels
    pub fn summarize(
        &self,
        transactions: &[Transaction],
        accounts: &[Account],
    ) -> ClassificationSummary {
        let mut summary = ClassificationSummary::default();
        for tx in transactions {
            summary.record(self.classify(tx, transactions, accounts));
        }
        summary
    }

    /// A transaction is transfer-coded when the aggregator tagged it with a
    /// "transfer" code or a transfer category.
    fn is_transfer_coded(&self, tx: &Transaction) -> bool {
        tx.transaction_code.as_deref() == Some("transfer")
            || self.taxonomy.is_transfer(tx.category_code())
    }

    fn is_internal_transfer(
        &self,
        tx: &Transaction,
        all_transactions: &[Transaction],
        accounts: &[Account],
    ) -> bool {
        if !self.is_transfer_coded(tx) {
            return false;
        }
        if self.has_counterpart_leg(tx, all_transactions) {
            debug!(id = %tx.id, name = %tx.name, "matched internal transfer counterpart");
            return true;
        }
        if self.meta_names_own_account(tx, accounts) {
            debug!(id = %tx.id, name = %tx.name, "payment meta names own account");
            return true;
        }
        false
    }

    /// Look for the opposite leg of a transfer: a transfer-coded transaction
    /// on a different account with a near-equal opposite-signed amount inside
    /// the date window.
    ///
    /// Linear scan per transaction. Fine for thousands of rows; index
    /// candidates by (account, date bucket) before reaching for larger
    /// volumes.
    fn has_counterpart_leg(&self, tx: &Transaction, all_transactions: &[Transaction]) -> bool {
        all_transactions.iter().any(|other| {
            other.id != tx.id
                && other.account_id != tx.account_id
                && other.amount * tx.amount < 0.0
                && (other.amount.abs() - tx.amount.abs()).abs()
                    < self.config.transfer_amount_tolerance
                && (other.date - tx.date).num_days().abs() <= self.config.transfer_window_days
                && self.is_transfer_coded(other)
        })
    }

    /// Case-insensitive substring match of the user's own account names and
    /// institutions against the transaction's payee/payer metadata.
    fn meta_names_own_account(&self, tx: &Transaction, accounts: &[Account]) -> bool {
        let Some(meta) = &tx.payment_meta else {
            return false;
        };
        [meta.payee.as_deref(), meta.payer.as_deref()]
            .into_iter()
            .flatten()
            .map(|text| text.to_lowercase())
            .any(|text| {
                accounts.iter().any(|account| {
                    contains_name(&text, &account.name)
                        || account
                            .institution
                            .as_deref()
                            .is_some_and(|inst| contains_name(&text, inst))
                })
            })
    }

    /// Depository-side leg of a credit-card payment: bill_payment-coded or
    /// payment-keyworded, and naming either one of the user's own credit
    /// accounts or a major card issuer.
    fn is_credit_card_payment(&self, tx: &Transaction, accounts: &[Account]) -> bool {
        let source = accounts.iter().find(|a| a.id == tx.account_id);
        if source.map(|a| a.account_type) != Some(AccountType::Depository) {
            return false;
        }

        let coded = tx.transaction_code.as_deref() == Some("bill_payment");
        if !coded && !self.taxonomy.mentions_payment_keyword(&tx.name) {
            return false;
        }

        let mut haystack = tx.name.clone();
        if let Some(payee) = tx.payment_meta.as_ref().and_then(|m| m.payee.as_deref()) {
            haystack.push(' ');
            haystack.push_str(payee);
        }

        if self.taxonomy.mentions_card_issuer(&haystack) {
            debug!(id = %tx.id, name = %tx.name, "card payment names a known issuer");
            return true;
        }

        let haystack = haystack.to_lowercase();
        accounts
            .iter()
            .filter(|a| a.account_type == AccountType::Credit)
            .any(|a| {
                contains_name(&haystack, &a.name)
                    || a.institution
                        .as_deref()
                        .is_some_and(|inst| contains_name(&haystack, inst))
            })
    }
}

/// Substring match that never matches on an empty needle
fn contains_name(haystack_lower: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack_lower.contains(&needle)
}
