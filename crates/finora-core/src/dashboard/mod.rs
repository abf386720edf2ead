//! Dashboard data for the UI layer.
//!
//! - `DashboardService`: serves period summaries through the shared
//!   `DashboardCache`, with derived accessors for display.
//! - `MonthlyFinance`: blends one period's real figures with the
//!   user's expected figures from a `BudgetStore`.
//!
//! Both publish their state through a `tokio::sync::watch` channel so a
//! UI can observe changes instead of polling.

pub mod error;
pub mod monthly;
pub mod normalize;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use error::FetchError;
pub use monthly::{MonthlyFinance, MonthlyFinanceData, MonthlyState};
pub use normalize::normalize_summary;
pub use service::{DashboardService, DashboardState};

use tokio::sync::watch;

/// State snapshots that carry an in-flight flag.
pub(crate) trait Loadable {
    fn set_loading(&mut self, loading: bool);
}

/// Marks a state as loading for as long as the guard lives.
///
/// Dropping the guard clears the flag on every exit path, including a
/// caller dropping the fetch future half way.
pub(crate) struct LoadingGuard<'a, T: Loadable> {
    state: &'a watch::Sender<T>,
}

impl<'a, T: Loadable> LoadingGuard<'a, T> {
    pub(crate) fn start(state: &'a watch::Sender<T>) -> Self {
        state.send_modify(|s| s.set_loading(true));
        Self { state }
    }
}

impl<T: Loadable> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.set_loading(false));
    }
}
