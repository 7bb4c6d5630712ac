//! Client-side synchronization core for md-kanban boards.
//!
//! The [`TaskStore`] owns the canonical task collection and keeps it
//! consistent with an asynchronous backend. [`DragDropCoordinator`] and
//! [`GitSyncCoordinator`] drive their interactions through it, and [`Board`]
//! ties them to a folder's lifetime.

pub mod backend;
pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod git_sync;
pub mod notice;
pub mod preferences;
pub mod scope;
pub mod store;

// Re-exports for convenience
pub use backend::{LocalBackend, RepoBackend, TaskBackend};
pub use board::{Board, BoardCommand, CommandReceiver, CommandSender, command_channel};
pub use config::{AppConfig, BoardConfig, SyncConfig};
pub use drag::{DragDropCoordinator, DragState, DropOutcome};
pub use error::BoardError;
pub use geometry::{ClosestCenter, CollisionDetector, Rect};
pub use git_sync::{GitSyncCoordinator, RepoPhase};
pub use notice::Notice;
pub use preferences::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, Preferences};
pub use scope::Scope;
pub use store::{LoadStatus, TaskStore};
