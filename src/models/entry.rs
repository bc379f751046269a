use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }
}

impl FromStr for EntryType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(EntryType::Income),
            "EXPENSE" => Ok(EntryType::Expense),
            other => Err(ParseEnumError {
                kind: "entry type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Confirmed => "CONFIRMED",
            EntryStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EntryStatus::Pending),
            "CONFIRMED" => Ok(EntryStatus::Confirmed),
            "CANCELLED" => Ok(EntryStatus::Cancelled),
            other => Err(ParseEnumError {
                kind: "entry status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A financial entry as seen by the service layer.
///
/// Every field is optional so that incomplete input can reach validation
/// and be rejected with a precise message. Records loaded from the store
/// always have every field except `created_at` populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialEntry {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub value: Option<Decimal>,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub status: Option<EntryStatus>,
    #[serde(rename = "user")]
    pub user_id: Option<i64>,
    pub created_at: Option<String>,
}

/// Validated entry fields, the only shape the entry store writes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub description: String,
    pub month: i64,
    pub year: i64,
    pub value: Decimal,
    pub entry_type: EntryType,
    pub user_id: i64,
}

/// Search predicate. `user_id` is mandatory; every other field narrows the
/// result only when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub user_id: i64,
    pub description: Option<String>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub entry_type: Option<EntryType>,
    pub status: Option<EntryStatus>,
}

impl EntryFilter {
    pub fn for_user(user_id: i64) -> Self {
        EntryFilter {
            user_id,
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &FinancialEntry) -> bool {
        if entry.user_id != Some(self.user_id) {
            return false;
        }
        if let Some(ref needle) = self.description {
            let haystack = entry.description.as_deref().unwrap_or_default();
            if !haystack.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        (self.month.is_none() || self.month == entry.month)
            && (self.year.is_none() || self.year == entry.year)
            && (self.entry_type.is_none() || self.entry_type == entry.entry_type)
            && (self.status.is_none() || self.status == entry.status)
    }
}

// Request/response models for the HTTP layer

/// Body of `POST /api/entries` and `PUT /api/entries/{id}`.
///
/// Enumerations arrive as raw strings so that unknown names become a 400
/// with a readable message instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPayload {
    pub description: Option<String>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub value: Option<Decimal>,
    pub user: Option<i64>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
}

/// Query string of `GET /api/entries`. Empty parameters (`month=`) count
/// as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrySearchParams {
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub month: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user: Option<i64>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    use serde::de::Error;

    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(D::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceResponse {
    pub user: i64,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FinancialEntry {
        FinancialEntry {
            id: Some(1),
            description: Some("Monthly Salary".to_string()),
            month: Some(3),
            year: Some(2024),
            value: Some(Decimal::new(150000, 2)),
            entry_type: Some(EntryType::Income),
            status: Some(EntryStatus::Pending),
            user_id: Some(7),
            created_at: None,
        }
    }

    #[test]
    fn test_enums_parse_their_literal_names() {
        assert_eq!("INCOME".parse::<EntryType>(), Ok(EntryType::Income));
        assert_eq!("EXPENSE".parse::<EntryType>(), Ok(EntryType::Expense));
        assert_eq!("CANCELLED".parse::<EntryStatus>(), Ok(EntryStatus::Cancelled));
        assert!("income".parse::<EntryType>().is_err());
        assert!("DONE".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn test_entry_serializes_with_api_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "INCOME");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["user"], 7);
        assert_eq!(json["value"], "1500.00");
    }

    #[test]
    fn test_payload_accepts_numeric_value() {
        let payload: EntryPayload = serde_json::from_str(
            r#"{"description":"Rent","month":1,"year":2024,"value":850.5,"user":1,"type":"EXPENSE"}"#,
        )
        .unwrap();
        assert_eq!(payload.value, Some(Decimal::new(8505, 1)));
        assert_eq!(payload.entry_type.as_deref(), Some("EXPENSE"));
        assert!(payload.status.is_none());
    }

    #[test]
    fn test_search_params_treat_empty_values_as_absent() {
        let params: EntrySearchParams =
            serde_urlencoded::from_str("description=&month=&year=&user=3").unwrap();
        assert_eq!(params.month, None);
        assert_eq!(params.year, None);
        assert_eq!(params.user, Some(3));

        let params: EntrySearchParams = serde_urlencoded::from_str("month=4&year=2024").unwrap();
        assert_eq!(params.month, Some(4));
        assert_eq!(params.year, Some(2024));
        assert_eq!(params.user, None);

        assert!(serde_urlencoded::from_str::<EntrySearchParams>("month=jan").is_err());
    }

    #[test]
    fn test_filter_folds_non_ascii_case() {
        let entry = FinancialEntry {
            description: Some("Salário de março".to_string()),
            ..sample()
        };
        let filter = EntryFilter {
            description: Some("SALÁRIO".to_string()),
            ..EntryFilter::for_user(7)
        };
        assert!(filter.matches(&entry));
    }

    #[test]
    fn test_filter_matches_only_set_fields() {
        let entry = sample();

        assert!(EntryFilter::for_user(7).matches(&entry));
        assert!(!EntryFilter::for_user(8).matches(&entry));

        let filter = EntryFilter {
            description: Some("salary".to_string()),
            year: Some(2024),
            ..EntryFilter::for_user(7)
        };
        assert!(filter.matches(&entry));

        let filter = EntryFilter {
            month: Some(4),
            ..EntryFilter::for_user(7)
        };
        assert!(!filter.matches(&entry));
    }
}
