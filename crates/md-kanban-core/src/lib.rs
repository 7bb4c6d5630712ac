//! Domain types & ordering rules for md-kanban boards.

/// Parse errors for wire values.
pub mod error;
/// Identifier types.
pub mod id;
/// Repository sync value types.
pub mod git;
/// Multi-key task ordering.
pub mod sort;
/// Workflow status and priority enums.
pub mod status;
/// Task records and creation drafts.
pub mod task;
/// Fixed-format sortable timestamps.
pub mod timestamp;

pub use error::ParseError;
pub use git::{DEFAULT_SYNC_BRANCH, GitSettings, SyncResult};
pub use id::TaskId;
pub use sort::{SortDirection, SortKey, SortOption, compare_tasks, sort_in_place, sort_tasks};
pub use status::{Priority, TaskStatus};
pub use task::{Due, SubTask, Task, TaskDraft, UNSET};
pub use timestamp::Timestamp;
