//! Backing file location
//!
//! Resolves where a ledger file lives: a base directory plus a file name,
//! with defaults for both and a default extension for bare names.

use std::path::{Path, PathBuf};

/// Directory used when none is configured
pub const DEFAULT_DIRECTORY: &str = "expenses";

/// File name used when none is given
pub const DEFAULT_FILE_NAME: &str = "expense.txt";

/// Extension appended to names that have none
pub const DEFAULT_EXTENSION: &str = "txt";

/// Directory and file name of a ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    directory: PathBuf,
    file_name: Option<String>,
}

impl StoreLocation {
    pub fn new(directory: impl Into<PathBuf>, file_name: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name,
        }
    }

    /// Returns the base directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the effective file name after applying defaults
    ///
    /// A missing or blank name becomes [`DEFAULT_FILE_NAME`]. A name without
    /// any `.` gets [`DEFAULT_EXTENSION`] appended.
    pub fn file_name(&self) -> String {
        let name = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME);

        if name.contains('.') {
            name.to_string()
        } else {
            format!("{}.{}", name, DEFAULT_EXTENSION)
        }
    }

    /// Returns the full path to the backing file
    pub fn path(&self) -> PathBuf {
        self.directory.join(self.file_name())
    }
}

impl Default for StoreLocation {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY, None)
    }
}
