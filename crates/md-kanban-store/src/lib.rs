//! Filesystem and git backends for md-kanban boards.

/// Error types for store operations.
pub mod error;
/// Markdown task folders.
pub mod files;
/// Git repository plumbing.
pub mod git;
/// Task file parsing and rendering.
pub mod markdown;

pub use error::StoreError;
pub use files::{MarkdownStore, NAMING_GUIDE_FILE, TEMPLATE_FILE};
pub use git::GitRepo;
pub use markdown::{MarkdownError, parse_task, render_task};
