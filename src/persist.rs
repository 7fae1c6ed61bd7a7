//! Persistence of plugin state between sessions.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::utils::app_paths::AppPaths;

/// Store plugins load their saved state from and write it back to
pub trait Persist {
    /// Previously saved ids for `key`, if any
    fn load(&self, key: &str) -> Option<Vec<String>>;

    fn save(&mut self, key: &str, ids: Vec<String>) -> Result<()>;
}

/// Keeps everything in memory; nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryPersist {
    entries: BTreeMap<String, Vec<String>>,
}

impl MemoryPersist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, ids: Vec<String>) -> Self {
        self.entries.insert(key.into(), ids);
        self
    }
}

impl Persist for MemoryPersist {
    fn load(&self, key: &str) -> Option<Vec<String>> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, ids: Vec<String>) -> Result<()> {
        self.entries.insert(key.to_string(), ids);
        Ok(())
    }
}

/// JSON object of key -> array of ids, stored in a single file
#[derive(Debug)]
pub struct JsonFilePersist {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFilePersist {
    /// Open the store at `path`. A missing file means nothing was saved yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        debug!(target: "persist", "Opened {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    /// Open the store in the application data directory
    pub fn open_default() -> Result<Self> {
        Self::open(AppPaths::persist_file()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist for JsonFilePersist {
    fn load(&self, key: &str) -> Option<Vec<String>> {
        let value = self.entries.get(key)?;
        match serde_json::from_value::<Vec<String>>(value.clone()) {
            Ok(ids) => Some(ids),
            Err(e) => {
                warn!(target: "persist", "Ignoring malformed entry '{}': {}", key, e);
                None
            }
        }
    }

    fn save(&mut self, key: &str, ids: Vec<String>) -> Result<()> {
        self.entries.insert(key.to_string(), serde_json::to_value(ids)?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
