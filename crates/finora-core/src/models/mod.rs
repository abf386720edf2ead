//! Data models for finora entities.
//!
//! This module contains the data structures exchanged with the API:
//!
//! - `DashboardSummary`, `ExpenseByCategory`, `MonthlyTrend`, `PeriodKey`
//! - `Household`, `HouseholdMember`: the account-grouping entity
//! - `Account`, `Transaction`: ledger entities and their request bodies
//! - `User`, `AuthResponse`: login payloads

pub mod account;
pub mod auth;
pub mod dashboard;
pub mod household;
pub mod transaction;

pub use account::{Account, AccountRequest, AccountType};
pub use auth::{AuthResponse, LoginRequest, User};
pub use dashboard::{DashboardSummary, ExpenseByCategory, MonthlyTrend, PeriodKey};
pub use household::{Household, HouseholdMember, HouseholdType, UpdateHouseholdRequest};
pub use transaction::{
    Transaction, TransactionCategory, TransactionFilter, TransactionRequest, TransactionSplit,
    TransactionType,
};
