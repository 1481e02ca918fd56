//! Key-value persistence for settings and command history.
//!
//! Callers get the store injected as `&dyn KvStore` rather than reaching for
//! ambient global state. Values are JSON; the typed layer lives in
//! [`crate::history`]. `subscribe` delivers the changed key after each
//! successful `set_raw`, in the caller's thread.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Callback invoked with the key that changed.
pub type ChangeListener = Box<dyn Fn(&str) + Send + Sync>;

pub trait KvStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<Value>>;
    fn set_raw(&self, key: &str, value: Value) -> Result<()>;
    fn subscribe(&self, listener: ChangeListener);
}

/// Write-through store over one pretty-printed JSON file.
///
/// The whole map is held in memory and rewritten on every set; the data is a
/// handful of settings and a bounded history list, so this stays cheap.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl JsonFileStore {
    /// Default store file: `~/.local/state/dlcmd/store.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcmd")?;
        Ok(xdg_dirs.get_state_home().join("store.json"))
    }

    /// Open the store at the default XDG path.
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path()?)
    }

    /// Open (or start empty at) `path`. A missing file is an empty store;
    /// a corrupt file is an error so data is not silently clobbered.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse store file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read store file: {}", path.display()))
            }
        };
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).context("serialize store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write store file: {}", self.path.display()))?;
        Ok(())
    }

    fn notify(&self, key: &str) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener(key);
        }
    }
}

impl KvStore for JsonFileStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(key.to_string(), value);
            self.persist(&entries)?;
        }
        self.notify(key);
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemStore {
    entries: Mutex<BTreeMap<String, Value>>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        for listener in self.listeners.lock().unwrap().iter() {
            listener(key);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}
