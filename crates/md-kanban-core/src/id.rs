use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a task: the path-like storage key minted by the backend.
///
/// The empty identifier is reserved for drafts that have not been
/// round-tripped through creation yet.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a backend-assigned storage key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Identifier of a task that has not been persisted yet.
    #[must_use]
    pub const fn draft() -> Self {
        Self(String::new())
    }

    /// Returns true for the "not yet persisted" sentinel.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the key as a filesystem path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
