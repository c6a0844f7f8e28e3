//! Expense Ledger - a plain-text personal expense tracker
//!
//! Expenses are kept one per line in a text file and addressed by their
//! 1-based line position. The interactive menu and the one-shot commands
//! both go through [`storage::LineStore`].

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Amount, Expense, ExpenseError};
pub use storage::{LineStore, StoreError, StoreLocation};
