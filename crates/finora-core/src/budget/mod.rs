//! Local persistence for expected (budgeted) income and expenses.
//!
//! Expected figures are entered by the user and never sent to the server.
//! They are keyed by household and period as `"{householdId}-{year}-{month}"`.

pub mod store;

pub use store::{BudgetKey, BudgetRecord, BudgetStore, BudgetStoreError, FileBudgetStore, MemoryBudgetStore};
