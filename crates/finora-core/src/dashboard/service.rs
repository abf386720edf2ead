use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{DashboardQuery, DashboardSource, DEFAULT_TREND_MONTHS};
use crate::cache::DashboardCache;
use crate::models::{DashboardSummary, ExpenseByCategory, MonthlyTrend, PeriodKey};
use crate::utils::period_label;

use super::error::{FetchError, DASHBOARD_ERROR_MESSAGE};
use super::normalize::{normalize_summary, DEFAULT_CURRENCY};
use super::{Loadable, LoadingGuard};

/// Observable snapshot of a `DashboardService`.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub data: Option<Arc<DashboardSummary>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Loadable for DashboardState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Serves dashboard summaries for the selected period.
///
/// Summaries go through the shared `DashboardCache`, so several services
/// built on the same cache reuse each other's fetches.
pub struct DashboardService<S> {
    source: S,
    cache: Arc<DashboardCache>,
    year: Option<i32>,
    month: Option<u32>,
    trend_months: u32,
    state: watch::Sender<DashboardState>,
}

impl<S: DashboardSource> DashboardService<S> {
    pub fn new(source: S, cache: Arc<DashboardCache>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            source,
            cache,
            year: None,
            month: None,
            trend_months: DEFAULT_TREND_MONTHS,
            state,
        }
    }

    pub fn with_trend_months(mut self, trend_months: u32) -> Self {
        self.trend_months = trend_months;
        self
    }

    /// Select the period used by `fetch`. `None` means "current".
    /// Does not fetch.
    pub fn set_period(&mut self, year: Option<i32>, month: Option<u32>) {
        self.year = year;
        self.month = month;
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// The selected period with blanks filled from today's date.
    pub fn period(&self) -> PeriodKey {
        PeriodKey::resolve(self.year, self.month)
    }

    /// Fetch the summary for the selected period.
    pub async fn fetch(&self, force: bool) -> Result<Arc<DashboardSummary>, FetchError> {
        self.fetch_period(self.year, self.month, self.trend_months, force)
            .await
    }

    /// Fetch the summary for an explicit period.
    ///
    /// Without `force`, a cache entry for the same period younger than the
    /// TTL is returned as is. Failures leave both the cache and the last
    /// loaded summary untouched.
    pub async fn fetch_period(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        trend_months: u32,
        force: bool,
    ) -> Result<Arc<DashboardSummary>, FetchError> {
        let period = PeriodKey::resolve(year, month);

        if !force {
            if let Some(cached) = self.cache.get(&period) {
                self.state.send_modify(|s| s.data = Some(Arc::clone(&cached)));
                return Ok(cached);
            }
        }

        let _loading = LoadingGuard::start(&self.state);
        self.state.send_modify(|s| s.error = None);

        let query = DashboardQuery {
            year,
            month,
            trend_months,
        };
        debug!(period = %period, trend_months, force, "Fetching dashboard");

        match self.source.get_dashboard(query).await {
            Ok(raw) => {
                let summary = Arc::new(normalize_summary(&raw, period));
                self.cache.store(period, Arc::clone(&summary));
                self.state.send_modify(|s| s.data = Some(Arc::clone(&summary)));
                Ok(summary)
            }
            Err(e) => {
                let err = FetchError::classify(e, DASHBOARD_ERROR_MESSAGE);
                warn!(period = %period, error = %err.api_error(), "Dashboard fetch failed");
                self.state
                    .send_modify(|s| s.error = Some(err.message().to_string()));
                Err(err)
            }
        }
    }

    /// Drop the shared cache entry so the next fetch goes to the server.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    // ===== Derived accessors =====

    pub fn data(&self) -> Option<Arc<DashboardSummary>> {
        self.state.borrow().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    fn project<T>(&self, f: impl FnOnce(&DashboardSummary) -> T, default: T) -> T {
        self.state.borrow().data.as_deref().map(f).unwrap_or(default)
    }

    pub fn total_balance(&self) -> f64 {
        self.project(|d| d.total_balance, 0.0)
    }

    pub fn monthly_income(&self) -> f64 {
        self.project(|d| d.monthly_income, 0.0)
    }

    pub fn monthly_expenses(&self) -> f64 {
        self.project(|d| d.monthly_expenses, 0.0)
    }

    pub fn monthly_savings(&self) -> f64 {
        self.project(|d| d.monthly_savings, 0.0)
    }

    pub fn expenses_by_category(&self) -> Vec<ExpenseByCategory> {
        self.project(|d| d.expenses_by_category.clone(), Vec::new())
    }

    pub fn monthly_trend(&self) -> Vec<MonthlyTrend> {
        self.project(|d| d.monthly_trend.clone(), Vec::new())
    }

    pub fn currency(&self) -> String {
        self.project(|d| d.currency.clone(), DEFAULT_CURRENCY.to_string())
    }

    /// "Mar 2024" for the loaded summary, empty before the first load.
    pub fn period_label(&self) -> String {
        self.project(|d| period_label(d.year, d.month), String::new())
    }

    /// True before the first load and for a household with no activity.
    pub fn is_empty(&self) -> bool {
        self.project(|d| d.is_empty(), true)
    }

    pub fn has_expenses(&self) -> bool {
        self.project(|d| !d.expenses_by_category.is_empty(), false)
    }

    pub fn has_trend(&self) -> bool {
        self.project(|d| !d.monthly_trend.is_empty(), false)
    }
}
