//! Main CLI application structure

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::config_cmd;
use super::expense;
use super::menu::Menu;
use super::output::{Output, OutputFormat};
use crate::domain::Amount;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "expense")]
#[command(author, version, about = "Plain-text personal expense tracker")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding ledger files
    #[arg(long, global = true, env = "EXPENSE_DIR")]
    pub dir: Option<PathBuf>,

    /// Ledger file name (".txt" is added when there is no extension)
    #[arg(long, global = true, env = "EXPENSE_FILE")]
    pub file: Option<String>,

    /// Use this config file instead of the default one
    #[arg(long, global = true, env = "EXPENSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an expense
    ///
    /// Examples:
    ///   expense add Food 12.50 "Lunch with Sam"
    ///   expense add Rent 900 --at "2024-03-01 09:00:00"
    Add {
        /// Expense category
        category: String,

        /// Amount, e.g. 12.50 or $1,200
        amount: Amount,

        /// Free-form description
        #[arg(default_value = "")]
        description: String,

        /// Timestamp (YYYY-MM-DD HH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// List all expenses
    List,

    /// Show one expense
    Show {
        /// Expense number (1-based)
        position: usize,
    },

    /// Replace an expense
    Update {
        /// Expense number (1-based)
        position: usize,

        /// Expense category
        category: String,

        /// Amount, e.g. 12.50
        amount: Amount,

        /// Free-form description
        #[arg(default_value = "")]
        description: String,

        /// New timestamp (keeps the original when omitted)
        #[arg(long)]
        at: Option<String>,
    },

    /// Remove an expense
    Remove {
        /// Expense number (1-based)
        position: usize,
    },

    /// Search expenses by text (case-insensitive)
    Search {
        /// Text to look for
        query: String,
    },

    /// Delete all expenses
    Clear {
        /// Confirm deletion
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show ledger location and size
    Info,

    /// Run the interactive menu
    Menu,

    /// Inspect configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` enables debug logs
/// for this crate.
fn init_tracing(verbose: bool) {
    let default = if verbose { "expense_ledger=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let output = Output::new(cli.format.unwrap_or(config.default_format));
    let location = config.location(cli.dir, cli.file);

    tracing::debug!(path = %location.path().display(), "resolved ledger location");

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Add {
            category,
            amount,
            description,
            at,
        } => expense::add(&output, &location, &category, amount, &description, at.as_deref())?,
        Commands::List => expense::list(&output, &location)?,
        Commands::Show { position } => expense::show(&output, &location, position)?,
        Commands::Update {
            position,
            category,
            amount,
            description,
            at,
        } => expense::update(
            &output,
            &location,
            position,
            &category,
            amount,
            &description,
            at.as_deref(),
        )?,
        Commands::Remove { position } => expense::remove(&output, &location, position)?,
        Commands::Search { query } => expense::search(&output, &location, &query)?,
        Commands::Clear { yes } => expense::clear(&output, &location, yes)?,
        Commands::Info => expense::info(&output, &location)?,
        Commands::Menu => {
            let stdin = io::stdin();
            Menu::new(stdin.lock(), io::stdout()).run(&location)?
        }
        Commands::Config(cmd) => config_cmd::run(cmd, &output, &config, cli.config.as_deref())?,
    }

    Ok(())
}
