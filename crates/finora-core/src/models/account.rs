use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccountType {
    Bank,
    Cash,
    CreditCard,
    Savings,
    Investment,
    Other,
}

impl AccountType {
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Bank => "Bank",
            AccountType::Cash => "Cash",
            AccountType::CreditCard => "Credit card",
            AccountType::Savings => "Savings",
            AccountType::Investment => "Investment",
            AccountType::Other => "Other",
        }
    }
}

impl TryFrom<u8> for AccountType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AccountType::Bank),
            1 => Ok(AccountType::Cash),
            2 => Ok(AccountType::CreditCard),
            3 => Ok(AccountType::Savings),
            4 => Ok(AccountType::Investment),
            5 => Ok(AccountType::Other),
            other => Err(format!("unknown account type {}", other)),
        }
    }
}

/// Accepts the label or a single word (`bank`, `credit-card`, `creditcard`).
impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match word.as_str() {
            "bank" => Ok(AccountType::Bank),
            "cash" => Ok(AccountType::Cash),
            "creditcard" => Ok(AccountType::CreditCard),
            "savings" => Ok(AccountType::Savings),
            "investment" => Ok(AccountType::Investment),
            "other" => Ok(AccountType::Other),
            _ => Err(format!("unknown account type '{}'", s)),
        }
    }
}

impl From<AccountType> for u8 {
    fn from(kind: AccountType) -> Self {
        match kind {
            AccountType::Bank => 0,
            AccountType::Cash => 1,
            AccountType::CreditCard => 2,
            AccountType::Savings => 3,
            AccountType::Investment => 4,
            AccountType::Other => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub kind: AccountType,
    pub balance: f64,
    pub currency: String,
    pub household_id: String,
}

/// Body for account creation.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub balance: f64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account() {
        let json = r#"{"id":"a1","name":"Checking","type":2,"balance":-120.5,"currency":"EUR","householdId":"h1"}"#;
        let account: Account = serde_json::from_str(json).expect("parse account");
        assert_eq!(account.kind, AccountType::CreditCard);
        assert_eq!(account.kind.label(), "Credit card");
        assert_eq!(account.household_id, "h1");
    }

    #[test]
    fn test_account_request_wire_shape() {
        let body = serde_json::to_value(AccountRequest {
            name: "Savings".to_string(),
            kind: AccountType::Savings,
            balance: 250.0,
            currency: "EUR".to_string(),
        })
        .expect("serialize request");
        assert_eq!(
            body,
            serde_json::json!({"name": "Savings", "type": 3, "balance": 250.0, "currency": "EUR"})
        );
    }

    #[test]
    fn test_account_type_from_str() {
        assert_eq!("credit-card".parse::<AccountType>(), Ok(AccountType::CreditCard));
        assert_eq!("Credit card".parse::<AccountType>(), Ok(AccountType::CreditCard));
        assert_eq!("CASH".parse::<AccountType>(), Ok(AccountType::Cash));
        assert!("crypto".parse::<AccountType>().is_err());
    }
}
