//! Tolerant mapping from the raw dashboard payload to `DashboardSummary`.
//!
//! The backend has shipped both `monthlyIncome` and `MonthlyIncome` style
//! keys. Every field is looked up under these aliases, in order:
//!
//! 1. the lower-camel name (`monthlyIncome`)
//! 2. the same name with its first letter capitalized (`MonthlyIncome`)
//! 3. any key equal to the name ignoring ASCII case (`Monthlyincome`)
//!
//! A `null` value counts as absent and falls through to the next alias.
//! Numbers coerce from numeric strings and booleans; anything else is 0.
//! List fields that are not arrays become empty lists.

use serde_json::Value;

use crate::models::{DashboardSummary, ExpenseByCategory, MonthlyTrend, PeriodKey};

/// Currency used when the payload has none.
pub const DEFAULT_CURRENCY: &str = "EUR";

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Look up `key` on a JSON object under its accepted aliases.
fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    let map = obj.as_object()?;
    let present = |v: &&Value| !v.is_null();

    map.get(key)
        .filter(present)
        .or_else(|| map.get(&capitalize(key)).filter(present))
        .or_else(|| {
            map.iter()
                .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
                .map(|(_, v)| v)
        })
}

/// Numeric coercion with 0 for anything missing or unparseable.
fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn list(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

fn expense_by_category(item: &Value) -> ExpenseByCategory {
    ExpenseByCategory {
        category: number(field(item, "category")) as i64,
        category_name: text(field(item, "categoryName")).unwrap_or_default(),
        amount: number(field(item, "amount")),
        percentage: number(field(item, "percentage")),
    }
}

fn monthly_trend(item: &Value) -> MonthlyTrend {
    MonthlyTrend {
        year: number(field(item, "year")) as i32,
        month: number(field(item, "month")) as u32,
        label: text(field(item, "label")).unwrap_or_default(),
        income: number(field(item, "income")),
        expenses: number(field(item, "expenses")),
        savings: number(field(item, "savings")),
    }
}

/// Build a `DashboardSummary` from a raw payload.
///
/// `period` supplies year/month when the payload lacks them (or has 0).
/// `monthlySavings` falls back to income minus expenses when missing or 0.
pub fn normalize_summary(raw: &Value, period: PeriodKey) -> DashboardSummary {
    let monthly_income = number(field(raw, "monthlyIncome"));
    let monthly_expenses = number(field(raw, "monthlyExpenses"));

    let monthly_savings = match number(field(raw, "monthlySavings")) {
        s if s != 0.0 => s,
        _ => monthly_income - monthly_expenses,
    };

    let year = match number(field(raw, "year")) as i32 {
        0 => period.year,
        y => y,
    };
    let month = match number(field(raw, "month")) as u32 {
        0 => period.month,
        m => m,
    };

    let currency = text(field(raw, "currency"))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    DashboardSummary {
        total_balance: number(field(raw, "totalBalance")),
        currency,
        year,
        month,
        monthly_income,
        monthly_expenses,
        monthly_savings,
        expenses_by_category: list(field(raw, "expensesByCategory"))
            .iter()
            .map(expense_by_category)
            .collect(),
        monthly_trend: list(field(raw, "monthlyTrend"))
            .iter()
            .map(monthly_trend)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PERIOD: PeriodKey = PeriodKey { year: 2024, month: 3 };

    #[test]
    fn test_mixed_casing_and_types() {
        let raw = json!({"Monthlyincome": "100", "monthlyExpenses": 40});
        let summary = normalize_summary(&raw, PERIOD);
        assert_eq!(summary.monthly_income, 100.0);
        assert_eq!(summary.monthly_expenses, 40.0);
        assert_eq!(summary.monthly_savings, 60.0);
    }

    #[test]
    fn test_lower_camel_wins_over_capitalized() {
        let raw = json!({"totalBalance": 10, "TotalBalance": 99, "Currency": "USD"});
        let summary = normalize_summary(&raw, PERIOD);
        assert_eq!(summary.total_balance, 10.0);
        assert_eq!(summary.currency, "USD");
    }

    #[test]
    fn test_null_falls_through_to_capitalized() {
        let raw = json!({"monthlyIncome": null, "MonthlyIncome": 250});
        assert_eq!(normalize_summary(&raw, PERIOD).monthly_income, 250.0);
    }

    #[test]
    fn test_explicit_savings_are_kept() {
        let raw = json!({"monthlyIncome": 100, "monthlyExpenses": 40, "monthlySavings": 75});
        assert_eq!(normalize_summary(&raw, PERIOD).monthly_savings, 75.0);

        let raw = json!({"monthlyIncome": 100, "monthlyExpenses": 40, "monthlySavings": "0"});
        assert_eq!(normalize_summary(&raw, PERIOD).monthly_savings, 60.0);
    }

    #[test]
    fn test_missing_lists_and_numbers_default() {
        let summary = normalize_summary(&json!({}), PERIOD);
        assert!(summary.expenses_by_category.is_empty());
        assert!(summary.monthly_trend.is_empty());
        assert_eq!(summary.total_balance, 0.0);
        assert_eq!(summary.currency, DEFAULT_CURRENCY);
        assert_eq!(summary.period(), PERIOD);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_non_list_values_become_empty() {
        let raw = json!({"expensesByCategory": {"category": 10}, "MonthlyTrend": "none"});
        let summary = normalize_summary(&raw, PERIOD);
        assert!(summary.expenses_by_category.is_empty());
        assert!(summary.monthly_trend.is_empty());
    }

    #[test]
    fn test_garbage_numbers_are_zero() {
        let raw = json!({"totalBalance": "lots", "monthlyIncome": [1], "monthlyExpenses": true});
        let summary = normalize_summary(&raw, PERIOD);
        assert_eq!(summary.total_balance, 0.0);
        assert_eq!(summary.monthly_income, 0.0);
        assert_eq!(summary.monthly_expenses, 1.0);
    }

    #[test]
    fn test_non_object_payload() {
        let summary = normalize_summary(&Value::Null, PERIOD);
        assert!(summary.is_empty());
        assert_eq!(summary.period(), PERIOD);
    }

    #[test]
    fn test_list_items_accept_both_casings() {
        let raw = json!({
            "Year": 2023,
            "Month": 11,
            "ExpensesByCategory": [
                {"Category": 10, "CategoryName": "Food", "Amount": "120.5", "Percentage": 60},
                {"category": 12, "categoryName": "Housing", "amount": 80, "percentage": 40}
            ],
            "monthlyTrend": [
                {"year": 2023, "month": 10, "label": "Oct", "income": 900, "expenses": 700, "savings": 200},
                {"Year": 2023, "Month": 11, "Label": "Nov", "Income": 1000, "Expenses": 200}
            ]
        });
        let summary = normalize_summary(&raw, PERIOD);
        assert_eq!(summary.period(), PeriodKey::new(2023, 11));

        assert_eq!(summary.expenses_by_category.len(), 2);
        let food = &summary.expenses_by_category[0];
        assert_eq!(food.category, 10);
        assert_eq!(food.category_name, "Food");
        assert_eq!(food.amount, 120.5);
        assert_eq!(summary.expenses_by_category[1].category_name, "Housing");

        assert_eq!(summary.monthly_trend.len(), 2);
        assert_eq!(summary.monthly_trend[0].savings, 200.0);
        let nov = &summary.monthly_trend[1];
        assert_eq!(nov.label, "Nov");
        assert_eq!(nov.income, 1000.0);
        // Trend items take savings as given, no derivation.
        assert_eq!(nov.savings, 0.0);
    }

    #[test]
    fn test_numeric_label_is_stringified() {
        let raw = json!({"monthlyTrend": [{"label": 3}]});
        assert_eq!(normalize_summary(&raw, PERIOD).monthly_trend[0].label, "3");
    }
}
