//! Dashboard summary types and the reporting period key.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

/// A (year, month) reporting period. Used as the cache key and as part of
/// the budget storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The period containing today's local date.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self::new(today.year(), today.month())
    }

    /// Fill in whichever half is missing from the current calendar date.
    pub fn resolve(year: Option<i32>, month: Option<u32>) -> Self {
        let now = Self::current();
        Self::new(year.unwrap_or(now.year), month.unwrap_or(now.month))
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ExpenseByCategory {
    pub category: i64,
    pub category_name: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

/// Period-scoped financial summary, built fresh from every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: f64,
    pub currency: String,
    pub year: i32,
    pub month: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub expenses_by_category: Vec<ExpenseByCategory>,
    pub monthly_trend: Vec<MonthlyTrend>,
}

impl DashboardSummary {
    pub fn period(&self) -> PeriodKey {
        PeriodKey::new(self.year, self.month)
    }

    /// True when nothing has been recorded for the household yet.
    pub fn is_empty(&self) -> bool {
        self.total_balance == 0.0
            && self.monthly_income == 0.0
            && self.monthly_expenses == 0.0
            && self.expenses_by_category.is_empty()
            && self.monthly_trend.is_empty()
    }
}
