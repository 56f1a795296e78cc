//! Session-scoped persistence of the capture record.
//!
//! The capture flow is the only writer; overlays read. Stores hold raw JSON
//! strings under string keys, and [`CaptureSession`] layers the
//! [`CapturedData`] encoding on top. Storage failures are logged and
//! swallowed on every path, so a broken store degrades to "no capture"
//! instead of breaking rendering.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::Result;
use crate::types::CapturedData;

/// Well-known key the capture record is stored under.
pub const CAPTURE_SESSION_KEY: &str = "getMyFitCaptureSession";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store; contents live as long as the value. Last write wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the store, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        // Write-then-rename so a reader never sees a half-written record.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Typed access to the capture record in a store.
#[derive(Debug)]
pub struct CaptureSession<S> {
    store: S,
}

impl<S: KeyValueStore> CaptureSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored capture, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<CapturedData> {
        let raw = match self.store.get_raw(CAPTURE_SESSION_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(%err, "failed to read capture session");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable capture session");
                None
            }
        }
    }

    /// Replace the stored capture. Returns `false` when the write failed.
    pub fn save(&self, data: &CapturedData) -> bool {
        match self.write(data) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "failed to save capture session");
                false
            }
        }
    }

    fn write(&self, data: &CapturedData) -> Result<()> {
        let raw = serde_json::to_string(data)?;
        self.store.set_raw(CAPTURE_SESSION_KEY, &raw)
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(CAPTURE_SESSION_KEY) {
            tracing::warn!(%err, "failed to clear capture session");
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
