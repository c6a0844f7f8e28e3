//! Interactive menu
//!
//! A numbered-option loop over a [`LineStore`]. Input and output are
//! generic so the loop can be driven from tests. Bad numeric input is
//! reported and re-prompted; storage failures end the session.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::{parse_position, Amount, Expense};
use crate::storage::{LineStore, StoreError, StoreLocation};

const OPTIONS: &str = "\
1. Add expense
2. View expenses
3. Update expense
4. Remove expense
5. Find expense (by number, #number or text)
6. Clear all expenses
7. Exit";

/// Interactive session state
pub struct Menu<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Runs the session until the user exits or input ends
    ///
    /// `location` supplies the directory and the default file name offered
    /// when the user leaves the prompt blank.
    pub fn run(&mut self, location: &StoreLocation) -> Result<()> {
        writeln!(self.out, "Welcome to the Expense tracker:")?;

        let Some(file_name) = self.prompt("What is the name of the file for expenses? ")? else {
            return Ok(());
        };
        let file_name = if file_name.is_empty() {
            None
        } else {
            Some(file_name)
        };
        let location = StoreLocation::new(
            location.directory(),
            file_name.or_else(|| Some(location.file_name())),
        );

        let mut store = LineStore::open(&location)
            .with_context(|| format!("Failed to open ledger: {}", location.path().display()))?;
        writeln!(
            self.out,
            "Using {} ({} expense(s))",
            store.path().display(),
            store.count()
        )?;

        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", OPTIONS)?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };
            debug!(choice = %choice, "menu selection");

            let keep_going = match choice.as_str() {
                "1" => self.add(&mut store)?,
                "2" => self.view(&store)?,
                "3" => self.update(&mut store)?,
                "4" => self.remove(&mut store)?,
                "5" => self.find(&store)?,
                "6" => self.clear(&mut store)?,
                "7" => {
                    writeln!(self.out, "Goodbye!")?;
                    false
                }
                other => {
                    writeln!(self.out, "Invalid option '{}'. Choose 1-7.", other)?;
                    true
                }
            };

            if !keep_going {
                break;
            }
        }

        Ok(())
    }

    /// Prints `message` and reads one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.out, "{}", message)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_category(&mut self) -> Result<Option<String>> {
        loop {
            let Some(category) = self.prompt("Category: ")? else {
                return Ok(None);
            };
            if !category.is_empty() {
                return Ok(Some(category));
            }
            writeln!(self.out, "Category cannot be empty")?;
        }
    }

    fn prompt_amount(&mut self) -> Result<Option<Amount>> {
        loop {
            let Some(raw) = self.prompt("Amount: ")? else {
                return Ok(None);
            };
            match raw.parse::<Amount>() {
                Ok(amount) => return Ok(Some(amount)),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }

    /// Collects category, amount and description; `None` at end of input
    fn prompt_expense(&mut self) -> Result<Option<(String, Amount, String)>> {
        let Some(category) = self.prompt_category()? else {
            return Ok(None);
        };
        let Some(amount) = self.prompt_amount()? else {
            return Ok(None);
        };
        let Some(description) = self.prompt("Description: ")? else {
            return Ok(None);
        };
        Ok(Some((category, amount, description)))
    }

    fn prompt_position(&mut self) -> Result<Option<usize>> {
        loop {
            let Some(raw) = self.prompt("Expense number: ")? else {
                return Ok(None);
            };
            match parse_position(&raw) {
                Ok(position) => return Ok(Some(position)),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }

    fn add(&mut self, store: &mut LineStore) -> Result<bool> {
        let Some((category, amount, description)) = self.prompt_expense()? else {
            return Ok(false);
        };

        let line = Expense::new(category, amount, description)?.to_line();
        let position = store.append(&line)?;
        writeln!(self.out, "Expense added: {} (#{})", line, position)?;

        Ok(true)
    }

    fn view(&mut self, store: &LineStore) -> Result<bool> {
        let records = store.list()?;

        if records.is_empty() {
            writeln!(self.out, "No expenses recorded.")?;
        } else {
            writeln!(self.out, "Expenses:")?;
            for (index, record) in records.iter().enumerate() {
                writeln!(self.out, "{}. {}", index + 1, record.trim_end())?;
            }
        }

        Ok(true)
    }

    fn update(&mut self, store: &mut LineStore) -> Result<bool> {
        let Some(position) = self.prompt_position()? else {
            return Ok(false);
        };

        let current = match report_out_of_range(store.find_at(position))? {
            Some(record) => record,
            None => {
                writeln!(self.out, "No expense at position {}", position)?;
                return Ok(true);
            }
        };
        writeln!(self.out, "Current: {}", current)?;

        let Some((category, amount, description)) = self.prompt_expense()? else {
            return Ok(false);
        };

        // An existing expense keeps its original timestamp
        let expense = match current.parse::<Expense>() {
            Ok(old) => Expense::at(old.timestamp, category, amount, description)?,
            Err(_) => Expense::new(category, amount, description)?,
        };
        let line = expense.to_line();

        match report_out_of_range(store.update_at(position, &line))? {
            Some(_) => writeln!(self.out, "Expense {} updated: {}", position, line)?,
            None => writeln!(self.out, "No expense at position {}", position)?,
        }

        Ok(true)
    }

    fn remove(&mut self, store: &mut LineStore) -> Result<bool> {
        let Some(position) = self.prompt_position()? else {
            return Ok(false);
        };

        if store.remove_at(position)? {
            writeln!(self.out, "Expense {} removed.", position)?;
        } else {
            writeln!(self.out, "No expense at position {}", position)?;
        }

        Ok(true)
    }

    fn find(&mut self, store: &LineStore) -> Result<bool> {
        let Some(query) = self.prompt("Expense number or search text: ")? else {
            return Ok(false);
        };

        // `#3` always means a position; a bare number is a position when it
        // is in range and search text otherwise
        if let Some(raw) = query.strip_prefix('#') {
            match parse_position(raw) {
                Ok(position) => match report_out_of_range(store.find_at(position))? {
                    Some(record) => writeln!(self.out, "Expense {}: {}", position, record)?,
                    None => writeln!(self.out, "No expense at position {}", position)?,
                },
                Err(e) => writeln!(self.out, "{}", e)?,
            }
            return Ok(true);
        }

        if let Ok(position) = parse_position(&query) {
            if let Some(record) = report_out_of_range(store.find_at(position))? {
                writeln!(self.out, "Expense {}: {}", position, record)?;
                return Ok(true);
            }
        }

        let matches = store.search(&query)?;
        if matches.is_empty() {
            writeln!(self.out, "No expenses found matching '{}'", query)?;
        } else {
            for (position, record) in matches {
                writeln!(self.out, "{}. {}", position, record)?;
            }
        }

        Ok(true)
    }

    fn clear(&mut self, store: &mut LineStore) -> Result<bool> {
        let Some(answer) = self.prompt("Delete all expenses? (y/n) ")? else {
            return Ok(false);
        };

        if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
            store.clear()?;
            writeln!(self.out, "All expenses cleared.")?;
        } else {
            writeln!(self.out, "Nothing cleared.")?;
        }

        Ok(true)
    }
}

/// Turns the out-of-range error into `None`; other store errors stay fatal
fn report_out_of_range<T>(result: Result<T, StoreError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_out_of_range() => Ok(None),
        Err(e) => Err(e.into()),
    }
}
