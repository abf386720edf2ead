//! Household models.
//!
//! A household groups the accounts and transactions of one person
//! (individual plan) or two (couple plan).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Household plan, encoded on the wire as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HouseholdType {
    Individual,
    Couple,
}

impl TryFrom<u8> for HouseholdType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(HouseholdType::Individual),
            1 => Ok(HouseholdType::Couple),
            other => Err(format!("unknown household type {}", other)),
        }
    }
}

impl FromStr for HouseholdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "individual" => Ok(HouseholdType::Individual),
            "couple" => Ok(HouseholdType::Couple),
            _ => Err(format!("expected 'individual' or 'couple', got '{}'", s)),
        }
    }
}

impl From<HouseholdType> for u8 {
    fn from(kind: HouseholdType) -> Self {
        match kind {
            HouseholdType::Individual => 0,
            HouseholdType::Couple => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Household {
    pub id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub kind: HouseholdType,
    pub name: String,
}

impl Household {
    pub fn is_individual(&self) -> bool {
        self.kind == HouseholdType::Individual
    }

    pub fn is_couple(&self) -> bool {
        self.kind == HouseholdType::Couple
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl HouseholdMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateHouseholdRequest {
    #[serde(rename = "type")]
    pub kind: HouseholdType,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_type_is_numeric_on_the_wire() {
        let household: Household =
            serde_json::from_str(r#"{"id":"h1","type":1,"name":"Casa"}"#).expect("parse household");
        assert!(household.is_couple());
        assert!(!household.is_individual());

        let body = serde_json::to_value(UpdateHouseholdRequest {
            kind: HouseholdType::Individual,
            name: "Solo".to_string(),
        })
        .expect("serialize request");
        assert_eq!(body, serde_json::json!({"type": 0, "name": "Solo"}));
    }

    #[test]
    fn test_unknown_household_type_is_rejected() {
        let parsed = serde_json::from_str::<Household>(r#"{"id":"h1","type":7,"name":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_household_type_from_str() {
        assert_eq!("Couple".parse::<HouseholdType>(), Ok(HouseholdType::Couple));
        assert!("family".parse::<HouseholdType>().is_err());
    }
}
