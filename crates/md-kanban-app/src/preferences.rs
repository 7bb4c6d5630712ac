//! Durable client-side preferences behind an injectable key-value store.

use anyhow::{Context, Result};
use md_kanban_core::GitSettings;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Key of the last opened folder.
pub const LAST_FOLDER_KEY: &str = "lastFolder";
/// Key of the serialized [`GitSettings`].
pub const GIT_SETTINGS_KEY: &str = "gitSettings";

/// String key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error when the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.
    ///
    /// # Errors
    /// Returns an error when the removal cannot be persisted.
    fn clear(&self, key: &str) -> Result<()>;
}

fn lock_entries(entries: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Volatile store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock_entries(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        lock_entries(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON object persisted to a single file, rewritten on every change.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`; a missing file starts empty.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// File backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock_entries(&self.entries);
        let mut updated = entries.clone();
        updated.insert(key.to_owned(), value.to_owned());
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut entries = lock_entries(&self.entries);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Typed view over a [`KeyValueStore`].
pub struct Preferences<K> {
    store: Arc<K>,
}

impl<K> Clone for Preferences<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K: KeyValueStore> Preferences<K> {
    /// Wrap a store.
    pub fn new(store: K) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Underlying store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Folder opened most recently, if any.
    pub fn last_folder(&self) -> Option<PathBuf> {
        self.store
            .get(LAST_FOLDER_KEY)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Remember `folder` as the most recently opened one.
    ///
    /// # Errors
    /// Returns an error when the store cannot persist the value.
    pub fn set_last_folder(&self, folder: &Path) -> Result<()> {
        self.store.set(LAST_FOLDER_KEY, &folder.to_string_lossy())
    }

    /// Forget the most recently opened folder.
    ///
    /// # Errors
    /// Returns an error when the store cannot persist the removal.
    pub fn clear_last_folder(&self) -> Result<()> {
        self.store.clear(LAST_FOLDER_KEY)
    }

    /// Stored git settings; `None` when unset or unreadable.
    pub fn stored_git_settings(&self) -> Option<GitSettings> {
        let raw = self.store.get(GIT_SETTINGS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable git settings");
                None
            }
        }
    }

    /// Stored git settings, or the defaults.
    pub fn git_settings(&self) -> GitSettings {
        self.stored_git_settings().unwrap_or_default()
    }

    /// Persist git settings.
    ///
    /// # Errors
    /// Returns an error when the settings cannot be serialized or stored.
    pub fn set_git_settings(&self, settings: &GitSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set(GIT_SETTINGS_KEY, &json)
    }
}
