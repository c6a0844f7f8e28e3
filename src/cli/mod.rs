//! # Command-Line Interface
//!
//! User-facing commands and the interactive menu.
//!
//! ## Commands
//!
//! | Command | Store call |
//! |---------|------------|
//! | `add` | append |
//! | `list` | list |
//! | `show` | find_at |
//! | `update` | update_at |
//! | `remove` | remove_at |
//! | `search` | search |
//! | `clear --yes` | clear |
//! | `info` | count |
//! | `menu` (default) | all of the above, interactively |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The interactive menu always prints text.
//!
//! ## Logging
//!
//! Logs go to stderr. `--verbose` enables debug logs; `RUST_LOG` overrides:
//! ```bash
//! RUST_LOG=expense_ledger=trace expense list
//! ```

mod app;
mod config_cmd;
mod expense;
mod menu;
mod output;

pub use app::{run, Cli, Commands};
pub use menu::Menu;
pub use output::{Output, OutputFormat};
