//! Errors surfaced by the board layer.

use md_kanban_core::TaskId;
use thiserror::Error;

/// Failures reported by [`crate::TaskStore`] and the coordinators built on it.
///
/// Backend failures carry the backend's message, formatted with its full
/// context chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Fetching the task collection failed.
    #[error("Failed to load tasks: {0}")]
    Load(String),

    /// Persisting an edit failed; the board has been reloaded.
    #[error("Failed to save task: {0}")]
    Save(String),

    /// The backend could not mint a new task.
    #[error("Failed to create task: {0}")]
    Create(String),

    /// The backend could not remove a task.
    #[error("Failed to delete task: {0}")]
    Delete(String),

    /// A draft without an id was passed where a stored task is required.
    #[error("Task has no id; create it before saving")]
    MissingId,

    /// The id is not part of the current collection.
    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    /// No folder is open.
    #[error("No task folder is open")]
    NoFolder,

    /// Durable preferences could not be written.
    #[error("Failed to write preferences: {0}")]
    Preferences(String),
}
