//! Line-addressed record storage
//!
//! Records are stored in a single UTF-8 text file, one per `\n`-terminated
//! line. Positions are 1-based and contiguous; removing a record renumbers
//! everything after it. Full rewrites go through a temp file and a rename,
//! and every mutation holds an exclusive lock on the backing file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::StoreLocation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Position {position} is out of range (the ledger holds {count} record(s))")]
    PositionOutOfRange { position: usize, count: usize },

    #[error("Failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Returns true for the out-of-range condition
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StoreError::PositionOutOfRange { .. })
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io {
        action,
        path,
        source,
    }
}

/// File-backed store of text records addressed by line position
#[derive(Debug)]
pub struct LineStore {
    path: PathBuf,
    count: usize,
}

impl LineStore {
    /// Opens (or creates) the ledger described by `location`
    pub fn open(location: &StoreLocation) -> Result<Self, StoreError> {
        Self::open_path(location.path())
    }

    /// Opens (or creates) the ledger at an explicit path
    ///
    /// Missing parent directories are created. An existing file seeds the
    /// record count; a missing one is created empty.
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
        }

        let count = if path.exists() {
            let count = split_records(&read_locked(&path)?).len();
            debug!(path = %path.display(), count, "opened existing ledger");
            count
        } else {
            File::create(&path).map_err(io_error("create ledger", &path))?;
            info!(path = %path.display(), "created ledger file");
            0
        };

        Ok(Self { path, count })
    }

    /// Returns the path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Re-derives the record count from disk
    ///
    /// Picks up writes made through another store instance on the same file.
    pub fn refresh(&mut self) -> Result<usize, StoreError> {
        let count = split_records(&read_locked(&self.path)?).len();
        if count != self.count {
            debug!(path = %self.path.display(), old = self.count, new = count, "record count refreshed");
        }
        self.count = count;
        Ok(count)
    }

    /// Returns every record in file order, each with its trailing newline
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let contents = read_locked(&self.path)?;
        Ok(split_records(&contents)
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// Appends a record and returns its position
    ///
    /// The record is not validated: embedded newlines produce extra physical
    /// lines, and the returned position is that of the last one.
    pub fn append(&mut self, record: &str) -> Result<usize, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error("open ledger", &self.path))?;

        file.lock_exclusive()
            .map_err(io_error("lock ledger", &self.path))?;

        // A dangling last line would otherwise be merged with the new record
        let needs_terminator =
            ends_without_newline(&file).map_err(io_error("read ledger", &self.path))?;

        let write = || -> io::Result<()> {
            let mut writer = BufWriter::new(&file);
            if needs_terminator {
                writer.write_all(b"\n")?;
            }
            writer.write_all(record.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()
        };
        write().map_err(io_error("write ledger", &self.path))?;

        file.sync_all().map_err(io_error("sync ledger", &self.path))?;

        self.count += record.matches('\n').count() + 1;
        debug!(path = %self.path.display(), position = self.count, "appended record");

        Ok(self.count)
    }

    /// Removes every record
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let file = self.lock()?;

        file.set_len(0)
            .map_err(io_error("truncate ledger", &self.path))?;
        file.sync_all().map_err(io_error("sync ledger", &self.path))?;

        debug!(path = %self.path.display(), removed = self.count, "cleared ledger");
        self.count = 0;

        Ok(())
    }

    /// Removes the record at `position`
    ///
    /// Returns `Ok(false)` without touching the file when the position is out
    /// of range.
    pub fn remove_at(&mut self, position: usize) -> Result<bool, StoreError> {
        let index = match self.index_of(position) {
            Ok(index) => index,
            Err(_) => {
                debug!(position, count = self.count, "remove ignored: position out of range");
                return Ok(false);
            }
        };

        let lock = self.lock()?;
        let mut records = self.read_records(&lock)?;

        if index >= records.len() {
            self.resync(records.len());
            return Ok(false);
        }

        let removed = records.remove(index);
        self.rewrite(&records)?;
        drop(lock);

        debug!(position, record = removed.trim_end(), "removed record");
        Ok(true)
    }

    /// Returns the record at `position` without its trailing newline
    pub fn find_at(&self, position: usize) -> Result<String, StoreError> {
        let index = self.index_of(position)?;
        let contents = read_locked(&self.path)?;

        split_records(&contents)
            .get(index)
            .map(|record| record.trim_end().to_string())
            .ok_or(StoreError::PositionOutOfRange {
                position,
                count: self.count,
            })
    }

    /// Replaces the record at `position` with `value`
    ///
    /// Fails with [`StoreError::PositionOutOfRange`] for an invalid position.
    pub fn update_at(&mut self, position: usize, value: &str) -> Result<bool, StoreError> {
        let index = self.index_of(position)?;

        let lock = self.lock()?;
        let mut records = self.read_records(&lock)?;

        if index >= records.len() {
            self.resync(records.len());
            return Err(StoreError::PositionOutOfRange {
                position,
                count: self.count,
            });
        }

        records[index] = format!("{}\n", value);
        self.rewrite(&records)?;
        drop(lock);

        debug!(position, "updated record");
        Ok(true)
    }

    /// Returns `(position, record)` pairs whose text contains `query`,
    /// ignoring case
    pub fn search(&self, query: &str) -> Result<Vec<(usize, String)>, StoreError> {
        let needle = query.to_lowercase();
        let contents = read_locked(&self.path)?;

        let matches: Vec<_> = split_records(&contents)
            .into_iter()
            .enumerate()
            .filter(|(_, record)| record.to_lowercase().contains(&needle))
            .map(|(index, record)| (index + 1, record.trim_end().to_string()))
            .collect();

        debug!(query, matches = matches.len(), "searched ledger");
        Ok(matches)
    }

    fn index_of(&self, position: usize) -> Result<usize, StoreError> {
        if position < 1 || position > self.count {
            return Err(StoreError::PositionOutOfRange {
                position,
                count: self.count,
            });
        }
        Ok(position - 1)
    }

    /// Opens the backing file and takes an exclusive lock on it
    fn lock(&self) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(io_error("open ledger", &self.path))?;

        file.lock_exclusive()
            .map_err(io_error("lock ledger", &self.path))?;

        Ok(file)
    }

    fn read_records(&self, mut file: &File) -> Result<Vec<String>, StoreError> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(io_error("read ledger", &self.path))?;

        Ok(split_records(&contents)
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// Replaces the file with `records` and updates the count
    ///
    /// Every record ends up terminated by exactly one newline. On failure the
    /// original file and count are left as they were.
    fn rewrite(&mut self, records: &[String]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(record);
            if !record.ends_with('\n') {
                contents.push('\n');
            }
        }

        replace_atomically(&self.path, &contents)?;

        self.count = split_records(&contents).len();
        Ok(())
    }

    fn resync(&mut self, actual: usize) {
        warn!(
            path = %self.path.display(),
            cached = self.count,
            actual,
            "ledger changed on disk; record count resynchronized"
        );
        self.count = actual;
    }
}

/// Splits file contents into records, keeping each trailing newline
///
/// An unterminated last line still counts as a record.
fn split_records(contents: &str) -> Vec<&str> {
    contents.split_inclusive('\n').collect()
}

fn read_locked(path: &Path) -> Result<String, StoreError> {
    let mut file = File::open(path).map_err(io_error("open ledger", path))?;

    file.lock_shared()
        .map_err(io_error("lock ledger", path))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(io_error("read ledger", path))?;

    // Lock is released when file is dropped
    Ok(contents)
}

fn ends_without_newline(mut file: &File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;

    Ok(last[0] != b'\n')
}

/// Writes `contents` to a temp file next to `path` and renames it over
/// `path`; the temp file is removed if any step fails
fn replace_atomically(path: &Path, contents: &str) -> Result<(), StoreError> {
    let temp_path = temp_path_for(path);

    let write_temp = || -> io::Result<()> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(&file);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        drop(writer);
        file.sync_all()
    };

    let result = write_temp()
        .map_err(io_error("write temp file", &temp_path))
        .and_then(|()| fs::rename(&temp_path, path).map_err(io_error("replace ledger", path)));

    if result.is_err() && temp_path.is_file() && fs::remove_file(&temp_path).is_err() {
        warn!(path = %temp_path.display(), "failed to clean up temp file");
    }

    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
