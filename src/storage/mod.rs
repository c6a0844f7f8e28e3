//! # Storage Layer
//!
//! Persistence for the expense ledger as a plain-text file.
//!
//! ## Storage Format
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Records | One `\n`-terminated line each | `{directory}/{file_name}` |
//! | Config | TOML | `{config dir}/config.toml` |
//!
//! The directory defaults to `expenses/` and the file name to `expense.txt`.
//! Names without an extension get `.txt` appended.
//!
//! ## Concurrency Safety
//!
//! - [`LineStore`] takes an exclusive `fs2` lock for each mutation and a
//!   shared lock for reads
//! - Rewrites are atomic (temp file + rename)
//! - The cached record count belongs to one instance; use
//!   [`LineStore::refresh`] after another instance has written
//!
//! ## Key Types
//!
//! - [`LineStore`] - Line-addressed record storage
//! - [`StoreLocation`] - Resolves the backing file path
//! - [`Config`] - User configuration

mod config;
mod line_store;
mod location;

pub use config::{Config, ConfigError, OutputFormat};
pub use line_store::{LineStore, StoreError};
pub use location::{StoreLocation, DEFAULT_DIRECTORY, DEFAULT_EXTENSION, DEFAULT_FILE_NAME};
