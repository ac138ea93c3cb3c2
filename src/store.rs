use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::Result;

/// String-keyed persistent storage. Values are stored verbatim.
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Move an unusable value out of the way so later writes don't destroy it.
    fn set_aside(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key under a data directory:
/// ~/.local/share/ghtrack/ (Linux) or ~/Library/Application Support/ghtrack/ (macOS)
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn backup_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.bak", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Written to a temp file in the same directory, then renamed over the old value
    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn set_aside(&self, key: &str) -> Result<()> {
        let backup = self.backup_path(key);
        std::fs::rename(self.path(key), &backup)?;
        tracing::warn!(path = %backup.display(), "moved unreadable value aside");
        Ok(())
    }
}

/// Process-local store, used when no data directory is available and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn set_aside(&self, key: &str) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            if let Some(value) = entries.remove(key) {
                entries.insert(format!("{}.bak", key), value);
            }
        }
        Ok(())
    }
}

/// Keep keys to a single path segment
fn sanitize_key(key: &str) -> String {
    key.replace(['/', '\\'], "_")
}
