//! [KeyValueStore] adapters backing the session store.

use crate::domain::session::KeyValueStore;
use anyhow::Context;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Keeps string values in a single JSON object file so the session survives restarts.
/// Every read goes back to the file, so two stores on the same path see each other's writes.
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> FileKeyValueStore {
        FileKeyValueStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, entries: &Map<String, Value>) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!("Saved session storage to {}", self.path.display());

        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Map<String, Value>)) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        change(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.load()?;
        Ok(entries
            .get(key)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_owned(), Value::String(value.to_owned()));
        })
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

/// Process-local storage, for sessions that should not outlive the program
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> MemoryKeyValueStore {
        MemoryKeyValueStore::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
