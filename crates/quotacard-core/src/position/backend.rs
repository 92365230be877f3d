//! Persistence backends for the card position record.

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key-value storage holding a single serialized position record
pub trait PositionBackend: Send + Sync {
    /// Read the stored record, `Ok(None)` if nothing has been written yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored record
    fn write(&self, record: &str) -> Result<()>;
}

impl<T: PositionBackend + ?Sized> PositionBackend for Arc<T> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, record: &str) -> Result<()> {
        (**self).write(record)
    }
}

/// Stores the record as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a backend for `key` under `dir`.
    ///
    /// The key becomes a file name, so only alphanumeric characters, `-` and
    /// `_` are accepted.
    pub fn new(dir: &Path, key: &str) -> Result<Self> {
        if key.is_empty() {
            bail!("Position key cannot be empty");
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!(
                "Invalid position key: '{}'. Only alphanumeric, '-', and '_' characters are allowed.",
                key
            );
        }

        Ok(Self {
            path: dir.join(format!("{}.json", key)),
        })
    }

    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PositionBackend for FileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read position file: {:?}", self.path)),
        }
    }

    /// Atomic write via a temp file and rename, so a reader never sees a
    /// partial record. No fsync: the record is cosmetic and written from the
    /// input path.
    fn write(&self, record: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create position directory: {:?}", dir))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let _ = fs::remove_file(&temp_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp position file: {:?}", temp_path))?;
        file.write_all(record.as_bytes())
            .with_context(|| format!("Failed to write temp position file: {:?}", temp_path))?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename position file: {:?}", self.path))?;

        Ok(())
    }
}

/// In-process backend (tests, `--no-persist`)
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with a record
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }
}

impl PositionBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.record.lock().clone())
    }

    fn write(&self, record: &str) -> Result<()> {
        *self.record.lock() = Some(record.to_string());
        Ok(())
    }
}
