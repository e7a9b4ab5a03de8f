//! Report command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use tally_core::{
    build_balance_sheet, Ledger, MetricsEngine, MonthKey, SnapshotAnalyzer, StatementBuilder,
    TransactionClassifier,
};

use super::truncate;

pub fn cmd_classify(ledger: &Ledger, json: bool) -> Result<()> {
    let classifier = TransactionClassifier::new();

    if json {
        let classified = classifier.classify_all(&ledger.transactions, &ledger.accounts);
        println!("{}", serde_json::to_string_pretty(&classified)?);
        return Ok(());
    }

    let summary = classifier.summarize(&ledger.transactions, &ledger.accounts);

    println!();
    println!("🏷️  Classification Summary");
    println!("   ─────────────────────────────────────────");
    println!("   {:25} │ {:>8}", "Label", "Count");
    println!("   ──────────────────────────┼──────────");
    println!("   {:25} │ {:>8}", "income", summary.income);
    println!(
        "   {:25} │ {:>8}",
        "expense_essential", summary.expense_essential
    );
    println!(
        "   {:25} │ {:>8}",
        "expense_discretionary", summary.expense_discretionary
    );
    println!(
        "   {:25} │ {:>8}",
        "internal_transfer", summary.internal_transfer
    );
    println!(
        "   {:25} │ {:>8}",
        "credit_card_payment", summary.credit_card_payment
    );
    println!("   {:25} │ {:>8}", "excluded", summary.excluded);
    println!("   ──────────────────────────┼──────────");
    println!("   {:25} │ {:>8}", "total", summary.total());

    Ok(())
}

pub fn cmd_snapshot(ledger: &Ledger, json: bool) -> Result<()> {
    let snapshot = SnapshotAnalyzer::new().analyze(&ledger.transactions);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending Snapshot");
    println!(
        "   Period: {} to {}",
        snapshot.period.start, snapshot.period.end
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if snapshot.total_spending == 0.0 {
        println!("   No spending found in this period.");
        return Ok(());
    }

    println!("   Total spending:      ${:.2}", snapshot.total_spending);
    println!("   Average daily spend: ${:.2}", snapshot.average_daily_spend);
    println!("   Weekly velocity:     ${:.2}", snapshot.weekly_velocity);
    println!(
        "   Discretionary ratio: {:.1}%",
        snapshot.discretionary_ratio
    );
    println!("   Subscription load:   ${:.2}", snapshot.subscription_load);

    println!();
    println!("   {:25} │ {:>10} │ {:>6} │ {:>5}", "Category", "Amount", "%", "Count");
    println!("   ──────────────────────────┼────────────┼────────┼───────");
    for category in &snapshot.category_breakdown {
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}% │ {:>5}",
            truncate(&category.category, 25),
            category.amount,
            category.percentage,
            category.transaction_count
        );
    }

    println!();
    println!("   {:25} │ {:>10} │ {:>5}", "Top Merchant", "Amount", "Count");
    println!("   ──────────────────────────┼────────────┼───────");
    for merchant in &snapshot.top_merchants {
        println!(
            "   {:25} │ {:>10.2} │ {:>5}",
            truncate(&merchant.merchant, 25),
            merchant.amount,
            merchant.transaction_count
        );
    }

    if !snapshot.recurring_charges.is_empty() {
        println!();
        println!(
            "   {:25} │ {:>9} │ {:>8} │ {:>10}",
            "Recurring Charge", "Amount", "Cadence", "Annual"
        );
        println!("   ──────────────────────────┼───────────┼──────────┼────────────");
        for charge in &snapshot.recurring_charges {
            println!(
                "   {:25} │ {:>9.2} │ {:>8} │ {:>10.2}",
                truncate(&charge.merchant, 25),
                charge.amount,
                charge.frequency.as_str(),
                charge.annual_impact
            );
        }
    }

    Ok(())
}

pub fn cmd_metrics(ledger: &Ledger, json: bool) -> Result<()> {
    let metrics = MetricsEngine::new().compute_metrics(&ledger.transactions, &ledger.accounts);

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!();
    println!("💵 Cash-Flow Metrics");
    println!("   ─────────────────────────────────────────");
    println!("   Period:         {} month(s)", metrics.period_months);
    println!("   Total income:   ${:.2}", metrics.total_income);
    println!("   Total expenses: ${:.2}", metrics.total_expenses);
    println!("   Net cash flow:  ${:.2}", metrics.net_cash_flow);
    println!("   Savings rate:   {:.1}%", metrics.savings_rate);

    Ok(())
}

pub fn cmd_trend(ledger: &Ledger, json: bool) -> Result<()> {
    let trend = MetricsEngine::new().compute_trend(&ledger.transactions, &ledger.accounts);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    println!();
    println!("📈 Cash-Flow Trend");
    println!("   ─────────────────────────────────────────────────────");
    println!("   Direction:       {}", trend.direction);
    if let Some(change) = &trend.mom_change {
        println!(
            "   Month over month: ${:.2} -> ${:.2} ({:+.1}%)",
            change.previous, change.current, change.percentage_change
        );
    }
    println!("   3-month average: ${:.2}", trend.three_month_average);

    if !trend.monthly.is_empty() {
        println!();
        println!(
            "   {:8} │ {:>10} │ {:>10} │ {:>10}",
            "Month", "Income", "Expenses", "Net"
        );
        println!("   ─────────┼────────────┼────────────┼────────────");
        for month in &trend.monthly {
            println!(
                "   {:8} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
                month.month.to_string(),
                month.income,
                month.expenses,
                month.net_cash_flow
            );
        }
    }

    Ok(())
}

pub fn cmd_categories(ledger: &Ledger, json: bool) -> Result<()> {
    let breakdown =
        MetricsEngine::new().category_breakdown(&ledger.transactions, &ledger.accounts);

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!();
    println!("🧾 Expense Categories");
    println!("   Total expenses: ${:.2}", breakdown.total_expenses);
    println!("   ─────────────────────────────────────────────────────────────────");

    if breakdown.categories.is_empty() {
        println!("   No expenses found.");
        return Ok(());
    }

    println!(
        "   {:4} │ {:22} │ {:>10} │ {:>6} │ {:>7}",
        "Rank", "Category", "Amount", "%", "MoM"
    );
    println!("   ─────┼────────────────────────┼────────────┼────────┼─────────");
    for category in &breakdown.categories {
        println!(
            "   {:4} │ {:22} │ {:>10.2} │ {:>5.1}% │ {:>+6.1}%",
            category.rank,
            truncate(&category.category, 22),
            category.total,
            category.percent_of_expenses,
            category.mom_change
        );
    }

    Ok(())
}

/// Resolve the statement window: explicit months, or the six months ending
/// with the current one
fn resolve_statement_window(from: Option<&str>, to: Option<&str>) -> Result<(MonthKey, MonthKey)> {
    let end: MonthKey = match to {
        Some(raw) => raw.parse().context("Invalid --to month (use YYYY-MM)")?,
        None => MonthKey::from_date(Utc::now().date_naive()),
    };
    let start: MonthKey = match from {
        Some(raw) => raw.parse().context("Invalid --from month (use YYYY-MM)")?,
        None => (0..5).fold(end, |month, _| month.prev()),
    };
    Ok((start, end))
}

pub fn cmd_statement(
    ledger: &Ledger,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let (start, end) = resolve_statement_window(from, to)?;

    let statement = StatementBuilder::new()
        .build(&ledger.transactions, &ledger.accounts, start, end)
        .context("Failed to build statement")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    println!();
    println!("🧾 Financial Statement ({} to {})", start, end);
    println!("   ──────────────────────────────────────────────────────────────────");
    println!(
        "   {:8} │ {:>10} │ {:>10} │ {:>10} │ {:>10} │ {:>7}",
        "Month", "Income", "Essential", "Discret.", "Net", "Save %"
    );
    println!("   ─────────┼────────────┼────────────┼────────────┼────────────┼─────────");
    for month in &statement.months {
        println!(
            "   {:8} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>6.1}%",
            month.month.to_string(),
            month.income.total,
            month.essential.total,
            month.discretionary.total,
            month.net_cash_flow,
            month.savings_rate
        );
    }

    println!();
    println!(
        "   Averages: income ${:.2}, expenses ${:.2}, savings rate {:.1}%",
        statement.summary.average_monthly_income,
        statement.summary.average_monthly_expenses,
        statement.summary.average_savings_rate
    );
    println!(
        "   Net savings over period: ${:.2}",
        statement.summary.total_net_savings
    );

    Ok(())
}

pub fn cmd_balance_sheet(ledger: &Ledger, json: bool) -> Result<()> {
    let sheet = build_balance_sheet(&ledger.accounts);

    if json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
        return Ok(());
    }

    println!();
    println!("💰 Balance Sheet");
    println!("   As of: {}", sheet.as_of.format("%Y-%m-%d %H:%M UTC"));
    println!("   ─────────────────────────────────────────");

    for asset in &sheet.assets {
        println!("   {:25} │ {:>12.2}", truncate(&asset.name, 25), asset.balance);
    }
    println!("   Liquid assets:    ${:.2}", sheet.liquid_assets);
    println!();
    for liability in &sheet.liabilities {
        println!(
            "   {:25} │ {:>12.2}",
            truncate(&liability.name, 25),
            liability.balance
        );
    }
    println!("   Credit-card debt: ${:.2}", sheet.credit_card_debt);
    println!();
    println!("   Net worth:        ${:.2}", sheet.net_worth);

    Ok(())
}
