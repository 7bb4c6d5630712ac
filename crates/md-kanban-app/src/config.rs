//! Board and sync settings loaded from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use md_kanban_core::{DEFAULT_SYNC_BRANCH, SortOption};
use serde::Deserialize;

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Board behaviour.
    #[serde(default)]
    pub board: BoardConfig,
    /// Repository sync behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns an error naming the offending key when a value is invalid.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.board.notice_ttl_ms == 0 {
            bail!("board.notice_ttl_ms must be greater than zero");
        }
        if self.sync.message_ttl_ms == 0 {
            bail!("sync.message_ttl_ms must be greater than zero");
        }
        if self.sync.default_branch.trim().is_empty() {
            bail!("sync.default_branch must not be empty");
        }
        Ok(())
    }
}

/// `[board]` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Ordering a freshly created task store starts with.
    pub default_sort: SortOption,
    /// Lifetime of transient error notices, in milliseconds.
    pub notice_ttl_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_sort: SortOption::default(),
            notice_ttl_ms: 5000,
        }
    }
}

impl BoardConfig {
    /// Notice lifetime as a duration.
    pub const fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// `[sync]` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Branch used until the user picks one.
    pub default_branch: String,
    /// Lifetime of the sync result message, in milliseconds.
    pub message_ttl_ms: u64,
    /// Sync once automatically when a folder inside a repository is opened.
    pub auto_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_SYNC_BRANCH.to_owned(),
            message_ttl_ms: 3000,
            auto_sync: true,
        }
    }
}

impl SyncConfig {
    /// Message lifetime as a duration.
    pub const fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }
}
