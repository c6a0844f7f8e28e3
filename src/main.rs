//! Expense Ledger - plain-text personal expense tracking

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = expense_ledger::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
