//! Cycle data persistence with file locking and a backup copy.
//!
//! The data lives in a single JSON file. Every save first copies the current
//! file to a `.bak` sibling (when it still parses), then atomically replaces
//! the primary. Loading falls back from primary to backup to empty defaults.

use crate::store::CycleRepository;
use crate::{CycleData, Error, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the primary data file inside a data directory
pub const DATA_FILE_NAME: &str = "cycle_data.json";

/// Durable cycle data store backed by a JSON file
#[derive(Clone, Debug)]
pub struct FileCycleStore {
    path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl FileCycleStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store using the standard file name inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the previous state, written before each overwrite
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }

    /// Sidecar file whose exclusive lock serializes writers
    fn lock_path(&self) -> PathBuf {
        with_suffix(&self.path, ".lock")
    }

    /// Read raw bytes under a shared lock
    fn read_locked(path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = Vec::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_end(&mut contents);
        file.unlock()?;
        read?;

        Ok(contents)
    }

    /// Parse one candidate file
    ///
    /// Missing or unparseable files yield `None`. A file that exists but
    /// cannot be read is an error, so callers never mistake it for corruption
    /// and write over it.
    fn try_read(path: &Path) -> Result<Option<CycleData>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = Self::read_locked(path).map_err(|e| {
            tracing::error!("Failed to read cycle data {:?}: {}", path, e);
            e
        })?;

        Ok(match serde_json::from_slice::<CycleData>(&contents) {
            Ok(mut data) => {
                let stored = (data.average_cycle_length, data.average_period_length);
                data.recompute_averages();
                if stored != (data.average_cycle_length, data.average_period_length) {
                    tracing::debug!("Stored averages in {:?} were stale, recomputed", path);
                }
                Some(data)
            }
            Err(e) => {
                tracing::warn!("Failed to parse cycle data {:?}: {}", path, e);
                None
            }
        })
    }

    /// Load cycle data
    ///
    /// Tries the primary file, then the backup, then returns empty defaults.
    /// Corrupted files are logged and skipped; I/O failures are returned.
    pub fn load(&self) -> Result<CycleData> {
        if let Some(data) = Self::try_read(&self.path)? {
            tracing::debug!("Loaded {} periods from {:?}", data.periods.len(), self.path);
            return Ok(data);
        }

        let backup = self.backup_path();
        if let Some(data) = Self::try_read(&backup)? {
            tracing::warn!(
                "Recovered {} periods from backup {:?}",
                data.periods.len(),
                backup
            );
            return Ok(data);
        }

        if self.path.exists() || backup.exists() {
            tracing::warn!("No usable cycle data at {:?}, starting empty", self.path);
        } else {
            tracing::info!("No cycle data found, using default state");
        }
        Ok(CycleData::default())
    }

    /// Write `contents` to `path` via a synced temp file and rename
    fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            Error::State(format!("data path {:?} has no parent directory", path))
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Copy the current primary to the backup if it is still valid
    ///
    /// A corrupt primary is never copied, so a good backup survives it.
    fn backup_current(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let contents = Self::read_locked(&self.path)?;

        if serde_json::from_slice::<CycleData>(&contents).is_err() {
            tracing::warn!("Skipping backup, primary {:?} is corrupted", self.path);
            return Ok(());
        }

        Self::write_atomic(&self.backup_path(), &contents)?;
        tracing::debug!("Backed up previous cycle data to {:?}", self.backup_path());
        Ok(())
    }

    /// Save cycle data, backing up the previous state first
    pub fn save(&self, data: &CycleData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        self.backup_current()?;

        let contents = serde_json::to_vec(data)?;
        Self::write_atomic(&self.path, &contents)?;

        tracing::debug!("Saved {} periods to {:?}", data.periods.len(), self.path);
        Ok(())
    }

    /// Hold the writer lock for the duration of `f`
    fn with_write_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let result = f();
        lock.unlock()?;
        result
    }
}

impl CycleRepository for FileCycleStore {
    fn load(&self) -> Result<CycleData> {
        FileCycleStore::load(self)
    }

    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CycleData) -> Result<T>,
    {
        self.with_write_lock(|| {
            let mut data = FileCycleStore::load(self)?;
            let before = data.clone();
            let value = f(&mut data)?;
            if data != before {
                self.save(&data)?;
            } else {
                tracing::debug!("Cycle data unchanged, skipping write");
            }
            Ok(value)
        })
    }
}
