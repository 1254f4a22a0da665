//! String-keyed persistent storage
//!
//! The discovery engine keeps two things across sessions: the recent search
//! terms and an offline snapshot of the last successful restaurant fetch.
//! Both go through [`KeyValueStore`]. Values are opaque strings (JSON in
//! practice); callers treat an unreadable value as absent.
//!
//! # Example
//!
//! ```rust,ignore
//! use tablemate_core::store::{FileStore, KeyValueStore};
//!
//! let mut store = FileStore::default_location()?;
//! store.set("recent_searches", r#"["치킨"]"#)?;
//!
//! if let Some(value) = store.get("recent_searches")? {
//!     println!("Stored: {}", value);
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent string-keyed storage
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value, returning whether it existed
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// Volatile store backed by a `HashMap`
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.values.remove(key).is_some())
    }
}

/// Sidecar metadata written next to every value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    /// Original key, for debugging
    key: String,
    /// Unix seconds when the value was written
    written_at: i64,
    /// Size of the value in bytes
    size_bytes: u64,
    /// SHA-256 of the value for integrity
    hash: String,
}

/// File-backed store: one `.data` file and one `.meta` sidecar per key
///
/// File names are the SHA-256 of the key, so arbitrary (including Korean)
/// keys are safe. A value whose hash no longer matches its sidecar is
/// deleted and reported as absent.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store under the platform data directory
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("tablemate");
        Self::new(dir)
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn hash_key(key: &str) -> String {
        hash_bytes(key.as_bytes())
    }

    fn meta_path(&self, hashed: &str) -> PathBuf {
        self.dir.join(format!("{}.meta", hashed))
    }

    fn data_path(&self, hashed: &str) -> PathBuf {
        self.dir.join(format!("{}.data", hashed))
    }

    fn discard(&self, hashed: &str) {
        let _ = fs::remove_file(self.meta_path(hashed));
        let _ = fs::remove_file(self.data_path(hashed));
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let hashed = Self::hash_key(key);
        let meta_path = self.meta_path(&hashed);
        let data_path = self.data_path(&hashed);

        if !meta_path.exists() || !data_path.exists() {
            return Ok(None);
        }

        let meta: EntryMeta = match serde_json::from_str(&fs::read_to_string(&meta_path)?) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(key, error = %e, "Unreadable store metadata, discarding entry");
                self.discard(&hashed);
                return Ok(None);
            }
        };

        let data = fs::read(&data_path)?;
        if hash_bytes(&data) != meta.hash {
            tracing::warn!(key, "Store entry failed integrity check, discarding");
            self.discard(&hashed);
            return Ok(None);
        }

        String::from_utf8(data)
            .map(Some)
            .map_err(|_| Error::cache_corrupted(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let hashed = Self::hash_key(key);
        let meta = EntryMeta {
            key: key.to_string(),
            written_at: chrono::Utc::now().timestamp(),
            size_bytes: value.len() as u64,
            hash: hash_bytes(value.as_bytes()),
        };

        fs::write(self.data_path(&hashed), value)?;
        fs::write(self.meta_path(&hashed), serde_json::to_string(&meta)?)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let hashed = Self::hash_key(key);
        let existed = self.meta_path(&hashed).exists();
        self.discard(&hashed);
        Ok(existed)
    }
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
