//! Scripted `DashboardSource` for service tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::api::{ApiError, DashboardQuery, DashboardSource};

pub(crate) struct FakeSource {
    scripted: Mutex<VecDeque<Result<Value, ApiError>>>,
    fallback: Value,
    queries: Mutex<Vec<DashboardQuery>>,
}

impl FakeSource {
    /// Answers every request with `payload` unless a response was queued.
    pub(crate) fn returning(payload: Value) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: payload,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-off response ahead of the fallback.
    pub(crate) fn queue(&self, response: Result<Value, ApiError>) {
        self.scripted.lock().unwrap().push_back(response);
    }

    pub(crate) fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub(crate) fn last_query(&self) -> Option<DashboardQuery> {
        self.queries.lock().unwrap().last().copied()
    }
}

impl DashboardSource for FakeSource {
    async fn get_dashboard(&self, query: DashboardQuery) -> Result<Value, ApiError> {
        self.queries.lock().unwrap().push(query);
        let scripted = self.scripted.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
