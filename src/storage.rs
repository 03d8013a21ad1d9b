//! Client-side key/value storage.
//!
//! Two scopes exist: durable storage that survives restarts (language choice,
//! cookie consent, a preselected location) and session storage that lives only
//! as long as the process (the exit-popup flag). Storage failures are logged
//! and otherwise ignored; a preference that cannot be saved is not an error
//! the visitor should see.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

pub const LANGUAGE_KEY: &str = "amanthos_lang";
pub const COOKIES_ACCEPTED_KEY: &str = "cookies_accepted";
pub const PRESELECT_LOCATION_KEY: &str = "preselect_location";
pub const EXIT_POPUP_SHOWN_KEY: &str = "exitShown";

pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn lock(map: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-lifetime storage. Used for the session scope and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Durable storage backed by a flat JSON object on disk, written through on
/// every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable preferences file {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(entries).context("Failed to encode preferences")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {:?}", self.path))
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Typed access to the visitor's stored preferences.
#[derive(Clone)]
pub struct Preferences {
    durable: Arc<dyn ClientStorage>,
    session: Arc<dyn ClientStorage>,
}

impl Preferences {
    pub fn new(durable: Arc<dyn ClientStorage>, session: Arc<dyn ClientStorage>) -> Self {
        Self { durable, session }
    }

    /// Both scopes in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    pub fn language(&self) -> Option<String> {
        self.durable.get(LANGUAGE_KEY)
    }

    pub fn set_language(&self, code: &str) {
        if let Err(e) = self.durable.set(LANGUAGE_KEY, code) {
            warn!("Could not persist language preference: {:#}", e);
        }
    }

    pub fn cookies_accepted(&self) -> bool {
        self.durable.get(COOKIES_ACCEPTED_KEY).is_some()
    }

    pub fn accept_cookies(&self) {
        if let Err(e) = self.durable.set(COOKIES_ACCEPTED_KEY, "1") {
            warn!("Could not persist cookie consent: {:#}", e);
        }
    }

    pub fn set_preselected_location(&self, property_id: &str) {
        if let Err(e) = self.durable.set(PRESELECT_LOCATION_KEY, property_id) {
            warn!("Could not persist preselected location: {:#}", e);
        }
    }

    /// Returns the preselected location once, clearing it.
    pub fn take_preselected_location(&self) -> Option<String> {
        let value = self.durable.get(PRESELECT_LOCATION_KEY)?;
        if let Err(e) = self.durable.remove(PRESELECT_LOCATION_KEY) {
            warn!("Could not clear preselected location: {:#}", e);
        }
        Some(value)
    }

    pub fn exit_popup_shown(&self) -> bool {
        self.session.get(EXIT_POPUP_SHOWN_KEY).is_some()
    }

    pub fn mark_exit_popup_shown(&self) {
        let _ = self.session.set(EXIT_POPUP_SHOWN_KEY, "1");
    }
}
