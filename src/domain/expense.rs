//! Expense domain model
//!
//! An expense is serialized into one tab-separated ledger line:
//! `timestamp\tcategory\t$amount\tdescription`.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Timestamp format used in ledger lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("Invalid amount '{0}': expected a number like 12.50")]
    InvalidAmount(String),

    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(String),

    #[error("Invalid position '{0}': expected a whole number")]
    InvalidPosition(String),

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("Category cannot be empty")]
    EmptyCategory,

    #[error("Not an expense line: {0}")]
    MalformedLine(String),
}

/// A non-negative money amount stored as integer cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    cents: u64,
}

impl Amount {
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }
}

impl FromStr for Amount {
    type Err = ExpenseError;

    /// Parses `12`, `12.5`, `12.50`, `$1,234.56`
    ///
    /// More than two fractional digits is rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExpenseError::InvalidAmount(s.trim().to_string());

        let cleaned: String = s
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.starts_with('-') {
            return Err(ExpenseError::NegativeAmount(s.trim().to_string()));
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Amount::from_cents)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}.{:02}", self.cents / 100, self.cents % 100))
    }
}

/// A single expense entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub amount: Amount,
    pub description: String,
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

impl Expense {
    /// Creates an expense stamped with the current local time
    pub fn new(
        category: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Self, ExpenseError> {
        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        Self::at(now, category, amount, description)
    }

    /// Creates an expense with an explicit timestamp
    pub fn at(
        timestamp: NaiveDateTime,
        category: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Self, ExpenseError> {
        let category = flatten(&category.into());
        if category.is_empty() {
            return Err(ExpenseError::EmptyCategory);
        }

        Ok(Self {
            timestamp,
            category,
            amount,
            description: flatten(&description.into()),
        })
    }

    /// Serializes the expense into one ledger line (no trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.category,
            self.amount,
            self.description
        )
    }
}

impl FromStr for Expense {
    type Err = ExpenseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\n', '\r']);
        let malformed = || ExpenseError::MalformedLine(line.to_string());

        let mut fields = line.splitn(4, '\t');
        let (timestamp, category, amount) = match (fields.next(), fields.next(), fields.next()) {
            (Some(ts), Some(category), Some(amount)) => (ts, category, amount),
            _ => return Err(malformed()),
        };
        let description = fields.next().unwrap_or("");

        let timestamp = parse_timestamp(timestamp).map_err(|_| malformed())?;
        let amount: Amount = amount.parse().map_err(|_| malformed())?;

        Self::at(timestamp, category, amount, description)
    }
}

/// Parses a timestamp in [`TIMESTAMP_FORMAT`]
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ExpenseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| ExpenseError::InvalidTimestamp(s.trim().to_string()))
}

/// Parses a 1-based record position typed by a user
///
/// Negative numbers are accepted and mapped to 0 so the store reports them
/// as out of range.
pub fn parse_position(s: &str) -> Result<usize, ExpenseError> {
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| ExpenseError::InvalidPosition(s.trim().to_string()))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

/// Collapses tabs and line breaks so a field cannot split the line
fn flatten(field: &str) -> String {
    field
        .split(['\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
