//! Durable storage backend: a JSON map file.
//!
//! File format:
//! ```json
//! { "version": 1, "entries": { "<raw key>": "<raw value>", ... } }
//! ```
//!
//! The whole map is held in memory and rewritten on every mutation. The
//! in-memory map only changes once the rewrite has landed on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::storage::backend::StorageBackend;

// ── File format constants ─────────────────────────────────────────────────────

const STORAGE_FILE_VERSION: u32 = 1;

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

// ── FileStorage ───────────────────────────────────────────────────────────────

/// File-backed [`StorageBackend`].
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the map file at `path`, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::StorageError` if the file exists but cannot be
    /// parsed, or `VaultError::Io` for filesystem errors.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let file: StorageFile = serde_json::from_slice(&bytes).map_err(|e| {
                VaultError::StorageError(format!(
                    "failed to parse storage file {}: {e}",
                    path.display()
                ))
            })?;
            if file.version != STORAGE_FILE_VERSION {
                return Err(VaultError::StorageError(format!(
                    "unsupported storage file version {} in {}",
                    file.version,
                    path.display()
                )));
            }
            file.entries
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| VaultError::StorageError("file storage lock poisoned".to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let file = StorageFile {
            version: STORAGE_FILE_VERSION,
            entries: entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| VaultError::SerializationError(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.lock()?;
        let next = BTreeMap::new();
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Write `data` to `path` through a sibling temp file and a rename.
///
/// Creates the parent directory if it does not exist.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
