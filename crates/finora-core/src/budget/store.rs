use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::PeriodKey;

/// Budget file name in the data directory
pub const BUDGET_FILE: &str = "budget.json";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    #[serde(default)]
    pub expected_income: f64,
    #[serde(default)]
    pub expected_expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BudgetKey {
    pub household_id: String,
    pub period: PeriodKey,
}

impl BudgetKey {
    pub fn new(household_id: impl Into<String>, period: PeriodKey) -> Self {
        Self {
            household_id: household_id.into(),
            period,
        }
    }
}

impl std::fmt::Display for BudgetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.household_id, self.period.year, self.period.month)
    }
}

#[derive(Error, Debug)]
pub enum BudgetStoreError {
    #[error("Failed to write budget file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize budget data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-value storage for budget records.
///
/// Reads never fail: missing or unreadable records are simply absent.
pub trait BudgetStore: Send + Sync {
    fn get(&self, key: &BudgetKey) -> Option<BudgetRecord>;

    fn set(&self, key: &BudgetKey, record: BudgetRecord) -> Result<(), BudgetStoreError>;
}

impl<T: BudgetStore + ?Sized> BudgetStore for Arc<T> {
    fn get(&self, key: &BudgetKey) -> Option<BudgetRecord> {
        (**self).get(key)
    }

    fn set(&self, key: &BudgetKey, record: BudgetRecord) -> Result<(), BudgetStoreError> {
        (**self).set(key, record)
    }
}

type RecordMap = HashMap<String, BudgetRecord>;

fn lock(records: &Mutex<RecordMap>) -> MutexGuard<'_, RecordMap> {
    records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Budget records kept in a single JSON object file.
pub struct FileBudgetStore {
    path: PathBuf,
    records: Mutex<RecordMap>,
}

impl FileBudgetStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = Self::read_records(&path);
        debug!(path = %path.display(), count = records.len(), "Loaded budget store");
        Self {
            path,
            records: Mutex::new(records),
        }
    }

    /// Open `budget.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(BUDGET_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(path: &Path) -> RecordMap {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No readable budget file, starting empty");
                return RecordMap::new();
            }
        };

        let raw: HashMap<String, serde_json::Value> = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Malformed budget file, starting empty");
                return RecordMap::new();
            }
        };

        raw.into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    debug!(key = %key, error = %e, "Skipping malformed budget record");
                    None
                }
            })
            .collect()
    }

    fn write_records(&self, records: &RecordMap) -> Result<(), BudgetStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl BudgetStore for FileBudgetStore {
    fn get(&self, key: &BudgetKey) -> Option<BudgetRecord> {
        lock(&self.records).get(&key.to_string()).copied()
    }

    fn set(&self, key: &BudgetKey, record: BudgetRecord) -> Result<(), BudgetStoreError> {
        let mut records = lock(&self.records);
        let mut updated = records.clone();
        updated.insert(key.to_string(), record);
        self.write_records(&updated)?;
        *records = updated;
        Ok(())
    }
}

/// Non-durable store, for tests and for runs that must leave the budget file alone.
#[derive(Default)]
pub struct MemoryBudgetStore {
    records: Mutex<RecordMap>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BudgetStore for MemoryBudgetStore {
    fn get(&self, key: &BudgetKey) -> Option<BudgetRecord> {
        lock(&self.records).get(&key.to_string()).copied()
    }

    fn set(&self, key: &BudgetKey, record: BudgetRecord) -> Result<(), BudgetStoreError> {
        lock(&self.records).insert(key.to_string(), record);
        Ok(())
    }
}
