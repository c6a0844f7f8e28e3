//! Domain models for the expense ledger
//!
//! Contains the expense record format without any I/O concerns.

mod expense;

pub use expense::{parse_position, parse_timestamp, Amount, Expense, ExpenseError, TIMESTAMP_FORMAT};
