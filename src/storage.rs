//! Durable storage backends for the serialized save record.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A single-slot store for the save payload.
pub trait SaveStorage {
    /// Returns `None` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>>;

    fn write(&mut self, payload: &str) -> Result<()>;
}

/// Writes to a temp file next to `path` and renames it into place.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = raw.len(), "read save");
        Ok(Some(raw))
    }

    fn write(&mut self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, payload)?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = payload.len(), "wrote save");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    payload: Option<String>,
    writes: usize,
}

/// In-process storage. Clones share the same slot, so a test can keep a
/// handle after giving one to the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<MemorySlot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.slot.borrow_mut().payload = Some(payload.into());
        storage
    }

    pub fn payload(&self) -> Option<String> {
        self.slot.borrow().payload.clone()
    }

    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        self.slot.borrow().writes
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().payload.clone())
    }

    fn write(&mut self, payload: &str) -> Result<()> {
        let mut slot = self.slot.borrow_mut();
        slot.payload = Some(payload.to_string());
        slot.writes += 1;
        Ok(())
    }
}
