//! Core library for finora.
//!
//! This crate holds everything the front ends share:
//!
//! - `api`: HTTP client for the finora REST API and its error type
//! - `models`: typed DTOs for dashboard, household, accounts, transactions
//! - `cache`: the single-slot, TTL-bound dashboard cache
//! - `budget`: local persistence for user-entered expected figures
//! - `dashboard`: the dashboard service and the monthly finance blender
//! - `auth`, `config`: session persistence, keychain token storage, settings

pub mod api;
pub mod auth;
pub mod budget;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, DashboardQuery, DashboardSource, ErrorKind};
pub use budget::{BudgetKey, BudgetRecord, BudgetStore, FileBudgetStore, MemoryBudgetStore};
pub use cache::DashboardCache;
pub use dashboard::{DashboardService, FetchError, MonthlyFinance, MonthlyFinanceData};
pub use models::{DashboardSummary, PeriodKey};
