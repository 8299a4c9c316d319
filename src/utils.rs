use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    error::ApiError,
    types::{AmountInput, Expense, ExpenseSummary},
};

pub const UNCATEGORIZED: &str = "uncategorized";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

pub fn hash_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn now_secs() -> u64 {
    Utc::now().timestamp() as u64
}

/// Parses a caller-supplied date and renders it as the canonical UTC timestamp
/// (`2024-01-05T00:00:00.000Z`).
///
/// Offsets are converted to UTC, naive date-times and bare dates are read as
/// UTC. Anything unparseable is rejected instead of being stored as garbage.
pub fn normalize_date(input: &str) -> Result<String, ApiError> {
    let raw = input.trim();

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

    match parsed {
        Some(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => Err(ApiError::Validation(format!("Invalid date '{}'", input))),
    }
}

pub fn coerce_amount(input: &AmountInput) -> Result<f64, ApiError> {
    let value = match input {
        AmountInput::Number(n) => *n,
        AmountInput::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ApiError::Validation(format!("Invalid amount '{}'", s)))?,
    };

    if !value.is_finite() {
        return Err(ApiError::Validation(format!(
            "Invalid amount '{}'",
            value
        )));
    }

    Ok(value)
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Renders a free-form field for display. Strings are shown without quotes,
/// other JSON values as their JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Total, count and per-category totals, categories sorted by name.
///
/// Missing, null and blank categories are grouped under [`UNCATEGORIZED`].
pub fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for expense in expenses {
        let category = expense
            .category
            .as_ref()
            .map(display_value)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *by_category.entry(category).or_insert(0.0) += expense.amount;
    }

    ExpenseSummary {
        count: expenses.len(),
        total: expenses.iter().map(|e| e.amount).sum(),
        by_category: by_category.into_iter().collect(),
    }
}
