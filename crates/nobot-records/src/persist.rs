//! Write-through persistence collaborators.
//!
//! The store calls [`Persistence::persist`] with the full snapshot after
//! every structural mutation. [`JsonFilePersistence`] is the file-backed
//! adapter used by the daemon; [`MemoryPersistence`] keeps the last
//! snapshot in memory for tests and embedding hosts.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::Snapshot;
use crate::schema::{decode_snapshot, Decoded};

/// Sink for store snapshots.
pub trait Persistence: Send + Sync {
    /// Save the full per-group mapping.
    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Stores the snapshot as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and decode the backing file.
    ///
    /// A missing file yields an empty snapshot. Legacy layouts are migrated
    /// and the file is rewritten in the nested layout.
    pub fn load(&self) -> Result<Decoded, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No record file yet; starting empty");
                return Ok(Decoded::default());
            }
            Err(e) => return Err(e.into()),
        };
        let doc: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
        let decoded = decode_snapshot(&doc)?;

        if decoded.needs_rewrite() {
            info!(
                path = %self.path.display(),
                migrated = decoded.migrated.len(),
                skipped = decoded.skipped,
                "Rewriting record file in nested layout"
            );
            self.persist(&decoded.snapshot)?;
        }
        Ok(decoded)
    }
}

impl Persistence for JsonFilePersistence {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        // Write to temp file first
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), groups = snapshot.len(), "Records saved");
        Ok(())
    }
}

/// Keeps the most recent snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    last: Mutex<Option<Snapshot>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryPersistence {
    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// The last snapshot written, if any.
    pub fn last(&self) -> Option<Snapshot> {
        self.last.lock().clone()
    }

    /// Make subsequent writes fail with an i/o error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl Persistence for MemoryPersistence {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Io(std::io::Error::other("persistence unavailable")));
        }
        *self.last.lock() = Some(snapshot.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
