//! The record store: each collection is one JSON array, loaded fully on every
//! read and rewritten fully on every mutation. Writers serialize through a
//! per-collection mutex; the rewrite goes through a temp file + rename so a
//! crash mid-save never leaves a half-written collection behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};

use crate::observability;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    /// The collection exists but does not parse as the expected record list.
    Corrupt { collection: String, detail: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "io error: {e}"),
            StoreError::Corrupt { collection, detail } => {
                write!(f, "corrupt collection {collection}: {detail}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

// ── Backends ─────────────────────────────────────────────────────

/// Raw byte storage for named collections. `read` returns `None` for a
/// collection that was never written — callers treat that as empty, not as
/// an error.
pub trait Backend: Send + Sync {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>>;
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// One `<name>.json` file per collection under a data directory.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create the data directory if needed and return a backend over it.
    pub fn new(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self { root: root.to_path_buf() })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl Backend for FileBackend {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.file_path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write to `<name>.json.tmp`, fsync, then rename over the live file.
    /// Readers only ever observe the old content or the new content.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)
    }
}

/// In-memory backend for tests — same contract, no filesystem.
#[derive(Default)]
pub struct MemoryBackend {
    files: DashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).map(|e| e.value().clone()))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

// ── Typed collections ────────────────────────────────────────────

/// Typed handle over one named collection. `load`/`save` move the whole
/// record list; `begin_write` hands out the guard that serializes
/// read-modify-write cycles (readers take no lock).
pub struct Collection<T> {
    name: &'static str,
    backend: Arc<dyn Backend>,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub fn new(name: &'static str, backend: Arc<dyn Backend>) -> Self {
        Self {
            name,
            backend,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Hold the returned guard across load → mutate → save. Two concurrent
    /// mutations of the same collection serialize here, so the second one
    /// observes the first one's write.
    pub async fn begin_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Full collection, in insertion order. A collection that was never
    /// saved is empty.
    pub fn load(&self) -> Result<Vec<T>, StoreError> {
        let Some(bytes) = self.backend.read(self.name)? else {
            return Ok(Vec::new());
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            collection: self.name.to_string(),
            detail: e.to_string(),
        })
    }

    /// Rewrite the whole collection.
    pub fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let start = std::time::Instant::now();
        let bytes = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Corrupt {
            collection: self.name.to_string(),
            detail: e.to_string(),
        })?;
        self.backend.write(self.name, &bytes)?;
        metrics::histogram!(observability::STORE_SAVE_DURATION_SECONDS, "collection" => self.name)
            .record(start.elapsed().as_secs_f64());
        metrics::gauge!(observability::STORE_RECORDS, "collection" => self.name)
            .set(records.len() as f64);
        Ok(())
    }
}
