//! Real-versus-expected report for one household and month.
//!
//! Real figures come from the dashboard endpoint (one-month trend,
//! bypassing the shared cache). Expected figures are typed in by the user
//! and kept in a `BudgetStore` under `"{householdId}-{year}-{month}"`.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{DashboardQuery, DashboardSource};
use crate::budget::{BudgetKey, BudgetRecord, BudgetStore, BudgetStoreError};
use crate::models::{DashboardSummary, PeriodKey};
use crate::utils::period_label;

use super::error::{FetchError, MONTHLY_ERROR_MESSAGE};
use super::normalize::normalize_summary;
use super::{Loadable, LoadingGuard};

/// Months of trend requested for the monthly report.
const MONTHLY_TREND_MONTHS: u32 = 1;

/// Combined report, recomputed from the current state on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFinanceData {
    pub real_income: f64,
    pub real_expenses: f64,
    pub real_savings: f64,
    pub expected_income: f64,
    pub expected_expenses: f64,
    pub expected_savings: f64,
    pub final_balance: f64,
    pub savings_rate: i64,
    pub currency: String,
    pub year: i32,
    pub month: u32,
    pub period_label: String,
}

/// Whole percent of income saved; 0 when there is no income.
/// Halves round up, as in `Math.round`.
pub fn savings_rate(income: f64, savings: f64) -> i64 {
    if income > 0.0 {
        (savings * 100.0 / income + 0.5).floor() as i64
    } else {
        0
    }
}

/// Observable snapshot of a `MonthlyFinance`.
#[derive(Debug, Clone)]
pub struct MonthlyState {
    pub period: PeriodKey,
    pub data: Option<Arc<DashboardSummary>>,
    pub expected_income: f64,
    pub expected_expenses: f64,
    pub loading: bool,
    pub error: Option<String>,
}

impl Loadable for MonthlyState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

pub struct MonthlyFinance<S, B, H> {
    source: S,
    store: B,
    household: H,
    state: watch::Sender<MonthlyState>,
}

impl<S, B, H> MonthlyFinance<S, B, H>
where
    S: DashboardSource,
    B: BudgetStore,
    H: Fn() -> Option<String> + Send + Sync,
{
    /// Start on the current month. `household` is asked for the household
    /// id every time one is needed; `None` means none exists yet.
    pub fn new(source: S, store: B, household: H) -> Self {
        let period = PeriodKey::current();
        let (state, _) = watch::channel(MonthlyState {
            period,
            data: None,
            expected_income: 0.0,
            expected_expenses: 0.0,
            loading: false,
            error: None,
        });
        let finance = Self {
            source,
            store,
            household,
            state,
        };
        finance.reload_expectations();
        finance
    }

    fn budget_key(&self, period: PeriodKey) -> Option<BudgetKey> {
        (self.household)().map(|hid| BudgetKey::new(hid, period))
    }

    /// Stored record for `period`, zeroes when absent or without a household.
    fn budget_for(&self, period: PeriodKey) -> BudgetRecord {
        self.budget_key(period)
            .and_then(|key| self.store.get(&key))
            .unwrap_or_default()
    }

    /// Load the expected figures for the selected period from the store.
    pub fn reload_expectations(&self) {
        let period = self.period();
        let budget = self.budget_for(period);
        debug!(period = %period, income = budget.expected_income, expenses = budget.expected_expenses, "Loaded expectations");
        self.state.send_modify(|s| {
            s.expected_income = budget.expected_income;
            s.expected_expenses = budget.expected_expenses;
        });
    }

    // ===== Period selection =====

    pub fn period(&self) -> PeriodKey {
        self.state.borrow().period
    }

    pub fn year(&self) -> i32 {
        self.period().year
    }

    pub fn month(&self) -> u32 {
        self.period().month
    }

    /// Select a period. When it differs from the current one the expected
    /// figures are reloaded for it; real figures wait for `fetch`.
    pub fn set_period(&self, period: PeriodKey) {
        let changed = self.state.send_if_modified(|s| {
            if s.period == period {
                false
            } else {
                s.period = period;
                true
            }
        });
        if changed {
            self.reload_expectations();
        }
    }

    pub fn set_year(&self, year: i32) {
        self.set_period(PeriodKey::new(year, self.month()));
    }

    pub fn set_month(&self, month: u32) {
        self.set_period(PeriodKey::new(self.year(), month));
    }

    /// "Mar 2024" for the selected period.
    pub fn period_label(&self) -> String {
        let period = self.period();
        period_label(period.year, period.month)
    }

    // ===== Expected figures =====

    pub fn expected_income(&self) -> f64 {
        self.state.borrow().expected_income
    }

    pub fn expected_expenses(&self) -> f64 {
        self.state.borrow().expected_expenses
    }

    pub fn set_expected_income(&self, value: f64) -> Result<(), BudgetStoreError> {
        self.state.send_modify(|s| s.expected_income = value);
        self.persist(|record| record.expected_income = value)
    }

    pub fn set_expected_expenses(&self, value: f64) -> Result<(), BudgetStoreError> {
        self.state.send_modify(|s| s.expected_expenses = value);
        self.persist(|record| record.expected_expenses = value)
    }

    /// Apply `update` to the stored record for the selected period, keeping
    /// the field it does not touch. Memory-only without a household.
    fn persist(&self, update: impl FnOnce(&mut BudgetRecord)) -> Result<(), BudgetStoreError> {
        let Some(key) = self.budget_key(self.period()) else {
            debug!("No household, expected figure kept in memory only");
            return Ok(());
        };

        let mut record = self.store.get(&key).unwrap_or_default();
        update(&mut record);
        self.store.set(&key, record).inspect_err(|e| {
            warn!(key = %key, error = %e, "Failed to persist budget record");
        })
    }

    // ===== Real figures =====

    /// Fetch the real figures for the selected period.
    ///
    /// Without a household the report is cleared and this returns `Ok`.
    /// On failure the previous figures stay in place.
    pub async fn fetch(&self) -> Result<(), FetchError> {
        if (self.household)().is_none() {
            debug!("No household, clearing monthly report");
            self.state.send_modify(|s| s.data = None);
            return Ok(());
        }

        let period = self.period();
        let _loading = LoadingGuard::start(&self.state);
        self.state.send_modify(|s| s.error = None);

        let query = DashboardQuery {
            year: Some(period.year),
            month: Some(period.month),
            trend_months: MONTHLY_TREND_MONTHS,
        };

        match self.source.get_dashboard(query).await {
            Ok(raw) => {
                let mut summary = normalize_summary(&raw, period);
                summary.monthly_savings = summary.monthly_income - summary.monthly_expenses;
                let summary = Arc::new(summary);

                // The period may have moved while the request was in flight.
                let budget = self.budget_for(self.period());
                self.state.send_modify(|s| {
                    s.data = Some(summary);
                    s.expected_income = budget.expected_income;
                    s.expected_expenses = budget.expected_expenses;
                });
                Ok(())
            }
            Err(e) => {
                let err = FetchError::classify(e, MONTHLY_ERROR_MESSAGE);
                warn!(period = %period, error = %err.api_error(), "Monthly finance fetch failed");
                self.state
                    .send_modify(|s| s.error = Some(err.message().to_string()));
                Err(err)
            }
        }
    }

    pub fn data(&self) -> Option<Arc<DashboardSummary>> {
        self.state.borrow().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonthlyState> {
        self.state.subscribe()
    }

    /// The blended report, `None` until real figures have been fetched.
    pub fn monthly_data(&self) -> Option<MonthlyFinanceData> {
        let state = self.state.borrow();
        let data = state.data.as_ref()?;

        let real_income = data.monthly_income;
        let real_expenses = data.monthly_expenses;
        let real_savings = real_income - real_expenses;

        Some(MonthlyFinanceData {
            real_income,
            real_expenses,
            real_savings,
            expected_income: state.expected_income,
            expected_expenses: state.expected_expenses,
            expected_savings: state.expected_income - state.expected_expenses,
            final_balance: real_income - real_expenses,
            savings_rate: savings_rate(real_income, real_savings),
            currency: data.currency.clone(),
            year: data.year,
            month: data.month,
            period_label: period_label(state.period.year, state.period.month),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ErrorKind};
    use crate::budget::{FileBudgetStore, MemoryBudgetStore};
    use crate::dashboard::error::NOT_FOUND_MESSAGE;
    use crate::dashboard::testing::FakeSource;
    use reqwest::StatusCode;
    use serde_json::json;
    use tempfile::TempDir;

    const MARCH: PeriodKey = PeriodKey { year: 2024, month: 3 };
    const APRIL: PeriodKey = PeriodKey { year: 2024, month: 4 };

    fn household() -> Option<String> {
        Some("H".to_string())
    }

    fn no_household() -> Option<String> {
        None
    }

    fn source(income: f64, expenses: f64) -> Arc<FakeSource> {
        Arc::new(FakeSource::returning(json!({
            "totalBalance": 5000,
            "currency": "EUR",
            "year": 2024,
            "month": 3,
            "monthlyIncome": income,
            "monthlyExpenses": expenses,
            "monthlySavings": 1
        })))
    }

    fn record(income: f64, expenses: f64) -> BudgetRecord {
        BudgetRecord {
            expected_income: income,
            expected_expenses: expenses,
        }
    }

    #[test]
    fn test_savings_rate() {
        assert_eq!(savings_rate(1000.0, 300.0), 30);
        assert_eq!(savings_rate(0.0, -50.0), 0);
        assert_eq!(savings_rate(-10.0, 5.0), 0);
        assert_eq!(savings_rate(3.0, 1.0), 33);
        assert_eq!(savings_rate(200.0, 1.0), 1); // 0.5 rounds up
        assert_eq!(savings_rate(100.0, -150.0), -150);
    }

    #[tokio::test]
    async fn test_fetch_blends_real_and_expected() {
        let store = Arc::new(MemoryBudgetStore::new());
        store
            .set(&BudgetKey::new("H", MARCH), record(1200.0, 800.0))
            .expect("seed store");
        let src = source(1000.0, 700.0);
        let finance = MonthlyFinance::new(Arc::clone(&src), store, household);
        finance.set_period(MARCH);

        finance.fetch().await.expect("fetch");
        let report = finance.monthly_data().expect("report available");

        assert_eq!(report.real_income, 1000.0);
        assert_eq!(report.real_expenses, 700.0);
        assert_eq!(report.real_savings, 300.0);
        assert_eq!(report.expected_income, 1200.0);
        assert_eq!(report.expected_expenses, 800.0);
        assert_eq!(report.expected_savings, 400.0);
        assert_eq!(report.final_balance, 300.0);
        assert_eq!(report.savings_rate, 30);
        assert_eq!(report.currency, "EUR");
        assert_eq!(report.period_label, "Mar 2024");

        // Savings are always derived, never taken from the payload.
        assert_eq!(finance.data().map(|d| d.monthly_savings), Some(300.0));

        let query = src.last_query().expect("query recorded");
        assert_eq!(query.year, Some(2024));
        assert_eq!(query.month, Some(3));
        assert_eq!(query.trend_months, 1);
    }

    #[tokio::test]
    async fn test_zero_income_has_zero_rate() {
        let finance = MonthlyFinance::new(source(0.0, 50.0), MemoryBudgetStore::new(), household);
        finance.fetch().await.expect("fetch");
        let report = finance.monthly_data().expect("report");
        assert_eq!(report.savings_rate, 0);
        assert_eq!(report.final_balance, -50.0);
    }

    #[tokio::test]
    async fn test_no_report_before_fetch() {
        let finance = MonthlyFinance::new(source(1.0, 1.0), MemoryBudgetStore::new(), household);
        assert!(finance.monthly_data().is_none());
    }

    #[tokio::test]
    async fn test_expected_income_survives_restart() {
        let dir = TempDir::new().expect("temp dir");

        let finance = MonthlyFinance::new(source(1.0, 1.0), FileBudgetStore::in_dir(dir.path()), household);
        finance.set_period(MARCH);
        finance.set_expected_income(500.0).expect("persist");
        drop(finance);

        let finance = MonthlyFinance::new(source(1.0, 1.0), FileBudgetStore::in_dir(dir.path()), household);
        finance.set_period(MARCH);
        finance.fetch().await.expect("fetch");
        assert_eq!(finance.expected_income(), 500.0);
        assert_eq!(finance.monthly_data().map(|r| r.expected_income), Some(500.0));
    }

    #[tokio::test]
    async fn test_setters_preserve_the_other_field() {
        let store = Arc::new(MemoryBudgetStore::new());
        let finance = MonthlyFinance::new(source(1.0, 1.0), Arc::clone(&store), household);
        finance.set_period(MARCH);

        finance.set_expected_income(900.0).expect("persist income");
        finance.set_expected_expenses(600.0).expect("persist expenses");
        finance.set_expected_income(950.0).expect("persist income again");

        assert_eq!(store.get(&BudgetKey::new("H", MARCH)), Some(record(950.0, 600.0)));
        assert_eq!(finance.expected_expenses(), 600.0);
    }

    #[tokio::test]
    async fn test_changing_month_reloads_expectations() {
        let store = Arc::new(MemoryBudgetStore::new());
        store
            .set(&BudgetKey::new("H", APRIL), record(2000.0, 1500.0))
            .expect("seed store");
        let src = source(1.0, 1.0);
        let finance = MonthlyFinance::new(Arc::clone(&src), store, household);
        finance.set_period(MARCH);
        finance.set_expected_income(10.0).expect("persist");

        finance.set_month(4);
        assert_eq!(finance.expected_income(), 2000.0);
        assert_eq!(finance.expected_expenses(), 1500.0);
        assert_eq!(src.calls(), 0);

        finance.set_month(3);
        assert_eq!(finance.expected_income(), 10.0);
        assert_eq!(finance.expected_expenses(), 0.0);
    }

    #[tokio::test]
    async fn test_setting_same_period_does_not_reload() {
        let store = Arc::new(MemoryBudgetStore::new());
        let finance = MonthlyFinance::new(source(1.0, 1.0), Arc::clone(&store), household);
        finance.set_period(MARCH);
        finance.set_expected_income(42.0).expect("persist");

        // Stored value changes behind the blender's back.
        store
            .set(&BudgetKey::new("H", MARCH), record(7.0, 0.0))
            .expect("overwrite");
        finance.set_period(MARCH);
        assert_eq!(finance.expected_income(), 42.0);
    }

    #[tokio::test]
    async fn test_without_household() {
        let store = Arc::new(MemoryBudgetStore::new());
        let src = source(1000.0, 700.0);
        let finance = MonthlyFinance::new(Arc::clone(&src), Arc::clone(&store), no_household);
        finance.set_period(MARCH);

        finance.fetch().await.expect("no household is not an error");
        assert!(finance.data().is_none());
        assert!(finance.monthly_data().is_none());
        assert_eq!(src.calls(), 0);

        finance.set_expected_income(300.0).expect("memory only");
        assert_eq!(finance.expected_income(), 300.0);
        assert_eq!(store.get(&BudgetKey::new("H", MARCH)), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_report() {
        let src = source(1000.0, 700.0);
        let finance = MonthlyFinance::new(Arc::clone(&src), MemoryBudgetStore::new(), household);
        finance.fetch().await.expect("fetch");

        src.queue(Err(ApiError::from_status(StatusCode::NOT_FOUND, "")));
        let err = finance.fetch().await.expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(finance.error().as_deref(), Some(NOT_FOUND_MESSAGE));
        assert!(!finance.loading());
        assert_eq!(finance.monthly_data().map(|r| r.real_income), Some(1000.0));

        src.queue(Err(ApiError::Unauthorized));
        let err = finance.fetch().await.expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(finance.error().as_deref(), Some(MONTHLY_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_subscribers_see_period_changes() {
        let finance = MonthlyFinance::new(source(1.0, 1.0), MemoryBudgetStore::new(), household);
        finance.set_period(MARCH);
        let mut rx = finance.subscribe();

        finance.set_period(APRIL);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().period, APRIL);
    }
}
