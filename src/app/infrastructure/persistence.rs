//! Key-value persistence for the settings store.
//!
//! The store only ever reads every key at startup and writes every key back
//! after a change, so backends deal in whole maps.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use crate::app::infrastructure::error::{AppError, Result};

pub type SettingsEntries = BTreeMap<String, String>;

pub trait SettingsBackend {
    /// Every stored key. A backend that has never been written returns an empty map.
    fn read_all(&self) -> Result<SettingsEntries>;

    fn write_all(&mut self, entries: &SettingsEntries) -> Result<()>;
}

/// Settings kept as a flat JSON object in the user's config directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend at the default config location
    pub fn at_default_location() -> Self {
        Self::new(Self::get_config_path())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("landtext");
        path.push("settings.json");
        path
    }
}

impl SettingsBackend for JsonFileBackend {
    fn read_all(&self) -> Result<SettingsEntries> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SettingsEntries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, entries: &SettingsEntries) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: SettingsEntries,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory backend. Clones share storage, so a test can keep a handle
/// while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        backend.state.borrow_mut().entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        backend
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn entries(&self) -> SettingsEntries {
        self.state.borrow().entries.clone()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }
}

impl SettingsBackend for MemoryBackend {
    fn read_all(&self) -> Result<SettingsEntries> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(AppError::Io(io::Error::other("memory backend read failure")));
        }
        Ok(state.entries.clone())
    }

    fn write_all(&mut self, entries: &SettingsEntries) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(AppError::Io(io::Error::other("memory backend write failure")));
        }
        state.entries = entries.clone();
        state.writes += 1;
        Ok(())
    }
}
