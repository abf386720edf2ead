use std::future::Future;
use std::sync::Arc;

use super::ApiError;

/// Number of trailing months in the dashboard trend when not specified.
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// Parameters for `GET /api/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub trend_months: u32,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            year: None,
            month: None,
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}

impl DashboardQuery {
    /// Query string pairs. Year and month are sent only when set,
    /// `trendMonths` always.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        if let Some(month) = self.month {
            params.push(("month", month.to_string()));
        }
        params.push(("trendMonths", self.trend_months.to_string()));
        params
    }
}

/// Where period summaries come from.
///
/// Returns the raw JSON object untouched; field-name normalization is the
/// caller's job since the backend is inconsistent about key casing.
pub trait DashboardSource: Send + Sync {
    fn get_dashboard(
        &self,
        query: DashboardQuery,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send;
}

impl<T: DashboardSource> DashboardSource for Arc<T> {
    fn get_dashboard(
        &self,
        query: DashboardQuery,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send {
        (**self).get_dashboard(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_skip_missing_period() {
        let params = DashboardQuery::default().params();
        assert_eq!(params, vec![("trendMonths", "6".to_string())]);
    }

    #[test]
    fn test_params_with_period() {
        let query = DashboardQuery {
            year: Some(2024),
            month: Some(3),
            trend_months: 1,
        };
        assert_eq!(
            query.params(),
            vec![
                ("year", "2024".to_string()),
                ("month", "3".to_string()),
                ("trendMonths", "1".to_string()),
            ]
        );
    }
}
