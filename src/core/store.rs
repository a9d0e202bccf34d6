//! Line-delimited record storage
//!
//! Each named file holds one JSON record per line. Lines that fail to parse
//! are skipped on load and counted, so callers can surface the damage
//! instead of losing it silently.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the storage layer
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("storage I/O error on {path}: {source}")]
    #[diagnostic(code(hangar::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record for {name}: {source}")]
    #[diagnostic(code(hangar::store::encode))]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable storage of named line files
pub trait RecordStore {
    /// All lines of the named file, or `None` when it does not exist yet
    fn read_lines(&self, name: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Append one line to the named file, creating it if needed
    fn append_line(&self, name: &str, line: &str) -> Result<(), StoreError>;

    /// Replace the whole named file with the given lines
    fn write_lines(&self, name: &str, lines: &[String]) -> Result<(), StoreError>;
}

/// Records decoded from a named file
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub records: Vec<T>,
    /// Non-empty lines that could not be decoded
    pub skipped: usize,
}

impl<T> Default for LoadOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Load every record of type T from the named file
///
/// A missing file yields an empty outcome. Lines that fail to parse are
/// skipped and counted.
pub fn load_all<T: DeserializeOwned, S: RecordStore + ?Sized>(
    store: &S,
    name: &str,
) -> Result<LoadOutcome<T>, StoreError> {
    let mut outcome = LoadOutcome::default();

    let Some(lines) = store.read_lines(name)? else {
        return Ok(outcome);
    };

    for (lineno, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                tracing::debug!(file = name, line = lineno + 1, error = %e, "skipping malformed record");
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

/// Append a single record to the named file
pub fn append_one<T: Serialize, S: RecordStore + ?Sized>(
    store: &S,
    name: &str,
    record: &T,
) -> Result<(), StoreError> {
    let line = encode(name, record)?;
    store.append_line(name, &line)
}

/// Rewrite the named file with the given records
pub fn replace_all<'a, T, I, S>(store: &S, name: &str, records: I) -> Result<(), StoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    S: RecordStore + ?Sized,
{
    let lines = records
        .into_iter()
        .map(|r| encode(name, r))
        .collect::<Result<Vec<_>, _>>()?;
    store.write_lines(name, &lines)
}

pub(crate) fn encode<T: Serialize>(name: &str, record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Encode {
        name: name.to_string(),
        source,
    })
}

/// Store backed by a directory of `.jsonl`/`.log` files
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

impl RecordStore for FileStore {
    fn read_lines(&self, name: &str) -> Result<Option<Vec<String>>, StoreError> {
        let path = self.path_of(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(content.lines().map(str::to_string).collect()))
    }

    fn append_line(&self, name: &str, line: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path_of(name);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)
    }

    fn write_lines(&self, name: &str, lines: &[String]) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path_of(name);
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        // Write beside the target, then rename, so a crash never leaves half a file
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }
}

/// In-memory store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with raw lines
    pub fn with_lines(self, name: &str, lines: &[&str]) -> Self {
        self.files().insert(
            name.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    /// Snapshot of the raw lines of a file
    pub fn lines(&self, name: &str) -> Vec<String> {
        self.files().get(name).cloned().unwrap_or_default()
    }

    // A panic while holding the lock leaves the map itself intact
    fn files(&self) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryStore {
    fn read_lines(&self, name: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.files().get(name).cloned())
    }

    fn append_line(&self, name: &str, line: &str) -> Result<(), StoreError> {
        self.files()
            .entry(name.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn write_lines(&self, name: &str, lines: &[String]) -> Result<(), StoreError> {
        self.files().insert(name.to_string(), lines.to_vec());
        Ok(())
    }
}
