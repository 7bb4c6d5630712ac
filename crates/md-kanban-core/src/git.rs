use serde::{Deserialize, Serialize};

/// Branch used when no preference has been stored.
pub const DEFAULT_SYNC_BRANCH: &str = "main";

/// Durable git sync preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSettings {
    /// Branch that sync pulls from and pushes to.
    pub sync_branch: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            sync_branch: DEFAULT_SYNC_BRANCH.to_owned(),
        }
    }
}

/// Outcome of one sync attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Remote changes were merged into the working tree.
    pub pulled: bool,
    /// Local changes were committed and pushed.
    pub pushed: bool,
    /// The pull stopped on a merge conflict.
    pub conflicts: bool,
    /// Human-readable summary.
    pub message: String,
}

impl SyncResult {
    /// Result synthesized from a failed sync so it flows through the same
    /// message lifecycle as a successful one.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}
