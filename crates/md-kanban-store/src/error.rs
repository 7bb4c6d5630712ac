//! Error types for md-kanban store operations.

use thiserror::Error;

/// Errors that can occur in `MarkdownStore` and `GitRepo` operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The task folder does not exist or is not a directory.
    #[error("Task folder not found: {0}")]
    FolderNotFound(String),

    /// A folder with the requested name already exists.
    #[error("Folder already exists: {0}")]
    FolderExists(String),

    /// A folder name was empty or contained a path separator.
    #[error("Invalid folder name: {0:?}")]
    InvalidFolderName(String),

    /// The task file does not exist.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The task has no storage key yet.
    #[error("Task has not been created yet")]
    DraftTask,

    /// A task file could not be interpreted.
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// File that failed to parse.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Git repository error.
    #[error("Git repository error: {0}")]
    GitError(#[from] git2::Error),

    /// A `git` subprocess failed.
    #[error("git {command} failed: {stderr}")]
    GitCommand {
        /// Subcommand and arguments.
        command: String,
        /// Captured standard error (or the spawn error).
        stderr: String,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
