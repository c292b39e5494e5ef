// 💾 Snapshot Store - Load/save seam for the shadow database
// Injected into the pipeline so tests run against an in-memory fake

use crate::record::{FundRecord, Snapshot};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Snapshot file exists but cannot be read or parsed. Fatal: a corrupt
    /// baseline must not be silently replaced by an empty one.
    #[error("failed to read snapshot from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Snapshot cannot be persisted. Fatal for the run.
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Persistence contract for the shadow database: read once at run start,
/// written wholesale at the end. No partial writes, no per-record updates.
pub trait SnapshotStore {
    fn load(&self) -> Result<Snapshot, StorageError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}

// ============================================================================
// CSV STORE
// ============================================================================

/// Production store: UTF-8 comma-delimited file with header
/// `Fund Name,Auth_Date,First_Seen`. A missing file is the empty snapshot;
/// a present-but-unreadable file is an error.
pub struct CsvSnapshotStore {
    path: PathBuf,
}

impl CsvSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SnapshotStore for CsvSnapshotStore {
    fn load(&self) -> Result<Snapshot, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no snapshot file, starting empty");
            return Ok(Snapshot::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| StorageError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: FundRecord = result.map_err(|e| StorageError::Read {
                path: self.path.clone(),
                source: e,
            })?;
            records.push(record);
        }

        debug!(count = records.len(), "loaded snapshot");
        Ok(Snapshot::from_records(records))
    }

    /// Write to a sibling temp file, then rename over the target, so a failed
    /// run never leaves a half-written baseline behind.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let tmp = self.tmp_path();

        let mut writer = csv::Writer::from_path(&tmp).map_err(|e| StorageError::Serialize {
            path: tmp.clone(),
            source: e,
        })?;

        for record in snapshot.records() {
            writer.serialize(record).map_err(|e| StorageError::Serialize {
                path: tmp.clone(),
                source: e,
            })?;
        }

        writer.flush().map_err(|e| StorageError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(count = snapshot.len(), path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY STORE (tests)
// ============================================================================

/// In-memory fake used by pipeline tests. Starts empty; `save` replaces the
/// held snapshot wholesale, same lifecycle as the CSV store.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshot: RefCell<Option<Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        MemorySnapshotStore {
            snapshot: RefCell::new(Some(snapshot)),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Snapshot, StorageError> {
        Ok(self.snapshot.borrow().clone().unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        *self.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}
