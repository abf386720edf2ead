//! Plain-text rendering of dashboard records.

use finora_core::dashboard::MonthlyFinanceData;
use finora_core::models::{
    Account, DashboardSummary, Household, HouseholdMember, Transaction, TransactionType,
};
use finora_core::utils::{format_amount, period_label};

pub fn summary(summary: &DashboardSummary) {
    let cur = summary.currency.as_str();
    println!("{}", period_label(summary.year, summary.month));
    println!("  Balance   {:>14}", format_amount(summary.total_balance, cur));
    println!("  Income    {:>14}", format_amount(summary.monthly_income, cur));
    println!("  Expenses  {:>14}", format_amount(summary.monthly_expenses, cur));
    println!("  Savings   {:>14}", format_amount(summary.monthly_savings, cur));

    if !summary.expenses_by_category.is_empty() {
        println!("\n  Expenses by category");
        for item in &summary.expenses_by_category {
            println!(
                "    {:<16} {:>14} {:>5.1}%",
                item.category_name,
                format_amount(item.amount, cur),
                item.percentage
            );
        }
    }

    if !summary.monthly_trend.is_empty() {
        println!("\n  Trend");
        for point in &summary.monthly_trend {
            println!(
                "    {:<10} in {:>12}  out {:>12}  saved {:>12}",
                point.label,
                format_amount(point.income, cur),
                format_amount(point.expenses, cur),
                format_amount(point.savings, cur)
            );
        }
    }
}

pub fn monthly(report: &MonthlyFinanceData) {
    let cur = report.currency.as_str();
    println!("{}            {:>14} {:>14}", report.period_label, "real", "expected");
    println!(
        "  Income     {:>14} {:>14}",
        format_amount(report.real_income, cur),
        format_amount(report.expected_income, cur)
    );
    println!(
        "  Expenses   {:>14} {:>14}",
        format_amount(report.real_expenses, cur),
        format_amount(report.expected_expenses, cur)
    );
    println!(
        "  Savings    {:>14} {:>14}",
        format_amount(report.real_savings, cur),
        format_amount(report.expected_savings, cur)
    );
    println!("  Final balance {}", format_amount(report.final_balance, cur));
    println!("  Savings rate  {}%", report.savings_rate);
}

pub fn totals_change(before: &DashboardSummary, after: &DashboardSummary) {
    let cur = after.currency.as_str();
    println!(
        "Income   {} -> {}",
        format_amount(before.monthly_income, cur),
        format_amount(after.monthly_income, cur)
    );
    println!(
        "Expenses {} -> {}",
        format_amount(before.monthly_expenses, cur),
        format_amount(after.monthly_expenses, cur)
    );
}

pub fn accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts yet.");
        return;
    }
    for account in accounts {
        println!(
            "{:<38} {:<24} {:<12} {:>14}",
            account.id,
            account.name,
            account.kind.label(),
            format_amount(account.balance, &account.currency)
        );
    }
}

pub fn transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }
    for tx in transactions {
        let sign = match tx.kind {
            TransactionType::Income => '+',
            TransactionType::Expense => '-',
        };
        println!(
            "{:<10} {}{:>12.2} {:<14} {}",
            tx.date,
            sign,
            tx.amount,
            tx.category.label(),
            tx.description.as_deref().unwrap_or("")
        );
    }
}

pub fn household(household: &Household, members: &[HouseholdMember]) {
    let plan = if household.is_couple() { "couple" } else { "individual" };
    println!("{} ({} plan)", household.name, plan);
    for member in members {
        println!("  {} <{}>", member.full_name(), member.email);
    }
}
