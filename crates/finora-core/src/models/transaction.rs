//! Transaction models.
//!
//! Type and category are integer codes on the wire; categories 0-4 are
//! income sources, 10-17 expense kinds, 99 is the catch-all.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TryFrom<u8> for TransactionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TransactionType::Income),
            1 => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type {}", other)),
        }
    }
}

impl From<TransactionType> for u8 {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => 0,
            TransactionType::Expense => 1,
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(format!("expected 'income' or 'expense', got '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransactionCategory {
    Salary,
    Freelance,
    Investment,
    Gift,
    Refund,
    Food,
    Transport,
    Housing,
    Utilities,
    Health,
    Entertainment,
    Shopping,
    Education,
    Other,
}

const CATEGORIES: [(TransactionCategory, u8, &str); 14] = [
    (TransactionCategory::Salary, 0, "Salary"),
    (TransactionCategory::Freelance, 1, "Freelance"),
    (TransactionCategory::Investment, 2, "Investment"),
    (TransactionCategory::Gift, 3, "Gift"),
    (TransactionCategory::Refund, 4, "Refund"),
    (TransactionCategory::Food, 10, "Food"),
    (TransactionCategory::Transport, 11, "Transport"),
    (TransactionCategory::Housing, 12, "Housing"),
    (TransactionCategory::Utilities, 13, "Utilities"),
    (TransactionCategory::Health, 14, "Health"),
    (TransactionCategory::Entertainment, 15, "Entertainment"),
    (TransactionCategory::Shopping, 16, "Shopping"),
    (TransactionCategory::Education, 17, "Education"),
    (TransactionCategory::Other, 99, "Other"),
];

impl TransactionCategory {
    pub fn code(&self) -> u8 {
        u8::from(*self)
    }

    pub fn label(&self) -> &'static str {
        CATEGORIES
            .iter()
            .find(|(c, _, _)| c == self)
            .map(|(_, _, label)| *label)
            .unwrap_or("Other")
    }

    pub fn is_income(&self) -> bool {
        self.code() < 10
    }
}

impl TryFrom<u8> for TransactionCategory {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CATEGORIES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(category, _, _)| *category)
            .ok_or_else(|| format!("unknown transaction category {}", code))
    }
}

impl From<TransactionCategory> for u8 {
    fn from(category: TransactionCategory) -> Self {
        match category {
            TransactionCategory::Salary => 0,
            TransactionCategory::Freelance => 1,
            TransactionCategory::Investment => 2,
            TransactionCategory::Gift => 3,
            TransactionCategory::Refund => 4,
            TransactionCategory::Food => 10,
            TransactionCategory::Transport => 11,
            TransactionCategory::Housing => 12,
            TransactionCategory::Utilities => 13,
            TransactionCategory::Health => 14,
            TransactionCategory::Entertainment => 15,
            TransactionCategory::Shopping => 16,
            TransactionCategory::Education => 17,
            TransactionCategory::Other => 99,
        }
    }
}

/// Accepts either the numeric code or the label (case-insensitive).
impl FromStr for TransactionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return TransactionCategory::try_from(code);
        }
        CATEGORIES
            .iter()
            .find(|(_, _, label)| label.eq_ignore_ascii_case(s))
            .map(|(category, _, _)| *category)
            .ok_or_else(|| format!("unknown transaction category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TransactionSplit {
    pub user_id: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub household_id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub kind: TransactionType,
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub category: TransactionCategory,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub splits: Vec<TransactionSplit>,
}

/// Body for transaction creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub account_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: TransactionCategory,
    pub amount: f64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<TransactionSplit>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}
