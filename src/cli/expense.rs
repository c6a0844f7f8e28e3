//! Expense CLI commands
//!
//! One-shot commands that open the ledger, perform a single store call,
//! and report the result.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use tracing::debug;

use super::output::Output;
use crate::domain::{parse_timestamp, Amount, Expense};
use crate::storage::{LineStore, StoreLocation};

/// Builds the JSON view of a stored record, including parsed fields when
/// the line is a well-formed expense
fn record_json(position: usize, record: &str) -> serde_json::Value {
    let record = record.trim_end();
    serde_json::json!({
        "position": position,
        "record": record,
        "expense": record.parse::<Expense>().ok(),
    })
}

fn build_expense(
    category: &str,
    amount: Amount,
    description: &str,
    at: Option<&str>,
) -> Result<Expense> {
    let expense = match at {
        Some(at) => {
            let timestamp: NaiveDateTime = parse_timestamp(at)?;
            Expense::at(timestamp, category, amount, description)?
        }
        None => Expense::new(category, amount, description)?,
    };
    Ok(expense)
}

fn open(location: &StoreLocation) -> Result<LineStore> {
    LineStore::open(location)
        .with_context(|| format!("Failed to open ledger: {}", location.path().display()))
}

pub fn add(
    output: &Output,
    location: &StoreLocation,
    category: &str,
    amount: Amount,
    description: &str,
    at: Option<&str>,
) -> Result<()> {
    let expense = build_expense(category, amount, description, at)?;
    let line = expense.to_line();

    let mut store = open(location)?;
    let position = store.append(&line)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "position": position,
            "record": line,
            "expense": expense,
        }));
    } else {
        output.success(&format!("Expense added: {} (#{})", line, position));
    }

    Ok(())
}

pub fn list(output: &Output, location: &StoreLocation) -> Result<()> {
    let store = open(location)?;
    let records = store.list()?;

    if output.is_json() {
        let items: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(index, record)| record_json(index + 1, record))
            .collect();
        output.data(&items);
    } else if records.is_empty() {
        println!("No expenses recorded.");
    } else {
        println!("Expenses:");
        for (index, record) in records.iter().enumerate() {
            let position = (index + 1).to_string();
            output.row(&[position.as_str(), record.trim_end()]);
        }
        println!();
        println!("{} expense(s)", records.len());
    }

    Ok(())
}

pub fn show(output: &Output, location: &StoreLocation, position: usize) -> Result<()> {
    let store = open(location)?;
    let record = store.find_at(position)?;

    if output.is_json() {
        output.data(&record_json(position, &record));
        return Ok(());
    }

    match record.parse::<Expense>() {
        Ok(expense) => {
            println!("Expense #{}", position);
            println!("{}", "=".repeat(40));
            println!("Date:        {}", expense.timestamp.format(crate::domain::TIMESTAMP_FORMAT));
            println!("Category:    {}", expense.category);
            println!("Amount:      {}", expense.amount);
            if !expense.description.is_empty() {
                println!("Description: {}", expense.description);
            }
        }
        Err(_) => println!("{}", record),
    }

    Ok(())
}

pub fn update(
    output: &Output,
    location: &StoreLocation,
    position: usize,
    category: &str,
    amount: Amount,
    description: &str,
    at: Option<&str>,
) -> Result<()> {
    let mut store = open(location)?;

    // Keep the original timestamp unless a new one is given
    let at = match at {
        Some(at) => Some(at.to_string()),
        None => store
            .find_at(position)?
            .parse::<Expense>()
            .ok()
            .map(|old| old.timestamp.format(crate::domain::TIMESTAMP_FORMAT).to_string()),
    };
    debug!(position, timestamp = ?at, "updating expense");

    let expense = build_expense(category, amount, description, at.as_deref())?;
    let line = expense.to_line();
    store.update_at(position, &line)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "position": position,
            "record": line,
            "updated": true,
        }));
    } else {
        output.success(&format!("Expense {} updated: {}", position, line));
    }

    Ok(())
}

pub fn remove(output: &Output, location: &StoreLocation, position: usize) -> Result<()> {
    let mut store = open(location)?;
    let count = store.count();

    if !store.remove_at(position)? {
        bail!(
            "No expense at position {} (the ledger holds {} record(s))",
            position,
            count
        );
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "position": position,
            "removed": true,
            "remaining": store.count(),
        }));
    } else {
        output.success(&format!("Expense {} removed", position));
    }

    Ok(())
}

pub fn search(output: &Output, location: &StoreLocation, query: &str) -> Result<()> {
    let store = open(location)?;
    let matches = store.search(query)?;

    if output.is_json() {
        let items: Vec<_> = matches
            .iter()
            .map(|(position, record)| record_json(*position, record))
            .collect();
        output.data(&items);
    } else if matches.is_empty() {
        println!("No expenses found matching '{}'", query);
    } else {
        println!("Expenses matching '{}':", query);
        for (position, record) in &matches {
            let position = position.to_string();
            output.row(&[position.as_str(), record.as_str()]);
        }
        println!();
        println!("Found {} expense(s)", matches.len());
    }

    Ok(())
}

pub fn clear(output: &Output, location: &StoreLocation, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to clear the ledger without --yes");
    }

    let mut store = open(location)?;
    let removed = store.count();
    store.clear()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "cleared": removed }));
    } else {
        output.success(&format!("Cleared {} expense(s)", removed));
    }

    Ok(())
}

pub fn info(output: &Output, location: &StoreLocation) -> Result<()> {
    let store = open(location)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": store.path().display().to_string(),
            "count": store.count(),
        }));
    } else {
        println!("Ledger: {}", store.path().display());
        println!("Expenses: {}", store.count());
    }

    Ok(())
}
