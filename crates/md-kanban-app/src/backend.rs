//! Async backend seams consumed by the board.

use anyhow::{Context, Error, Result};
use md_kanban_core::{SyncResult, Task, TaskDraft, TaskId};
use md_kanban_store::{GitRepo, MarkdownStore};
use std::path::{Path, PathBuf};

/// Persistence operations for one folder of tasks.
///
/// Every call may suspend; callers must not assume the board is unchanged
/// when a call returns.
pub trait TaskBackend: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error> + Send;

    /// Fetch the full task collection of `folder`.
    ///
    /// # Errors
    /// Returns a backend-specific error when the folder cannot be read.
    fn load(&self, folder: &Path) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send;

    /// Persist an edited task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the write is rejected.
    fn save(&self, folder: &Path, task: &Task) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Mint a task from `draft`; the backend assigns the id and timestamps.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be created.
    fn create(&self, folder: &Path, draft: &TaskDraft) -> impl Future<Output = Result<Task, Self::Error>> + Send;

    /// Remove a task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be removed.
    fn delete(&self, folder: &Path, id: &TaskId) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Version-control operations for the repository enclosing a folder.
pub trait RepoBackend: Send + Sync {
    /// Error type bubbled up from the repository layer.
    type Error: Into<Error> + Send;

    /// Whether `folder` lives inside a repository.
    ///
    /// # Errors
    /// Returns a backend-specific error when detection fails.
    fn check_repo(&self, folder: &Path) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Branch names available for sync.
    ///
    /// # Errors
    /// Returns a backend-specific error when branches cannot be listed.
    fn list_branches(&self, folder: &Path) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Branch currently checked out.
    ///
    /// # Errors
    /// Returns a backend-specific error when HEAD cannot be read.
    fn current_branch(&self, folder: &Path) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Pull, commit, and push against `branch`.
    ///
    /// # Errors
    /// Returns a backend-specific error when any step fails.
    fn sync(&self, folder: &Path, branch: &str) -> impl Future<Output = Result<SyncResult, Self::Error>> + Send;
}

/// Render a backend error with its full context chain.
pub(crate) fn describe(err: impl Into<Error>) -> String {
    let err: Error = err.into();
    format!("{err:#}")
}

/// Markdown folders on the local filesystem, synced with the `git` binary.
///
/// Blocking work runs on the tokio blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

async fn blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .context("Background task failed")?
}

impl TaskBackend for LocalBackend {
    type Error = Error;

    async fn load(&self, folder: &Path) -> Result<Vec<Task>> {
        let folder = folder.to_path_buf();
        blocking(move || {
            MarkdownStore::open(&folder)
                .and_then(|store| store.load_tasks())
                .with_context(|| format!("loading tasks from {}", folder.display()))
        })
        .await
    }

    async fn save(&self, folder: &Path, task: &Task) -> Result<()> {
        let folder = folder.to_path_buf();
        let task = task.clone();
        blocking(move || {
            MarkdownStore::open(folder)
                .and_then(|store| store.save_task(&task))
                .with_context(|| format!("saving {}", task.id))
        })
        .await
    }

    async fn create(&self, folder: &Path, draft: &TaskDraft) -> Result<Task> {
        let folder = folder.to_path_buf();
        let draft = draft.clone();
        blocking(move || {
            MarkdownStore::open(&folder)
                .and_then(|store| store.create_task(&draft))
                .with_context(|| format!("creating a task in {}", folder.display()))
        })
        .await
    }

    async fn delete(&self, folder: &Path, id: &TaskId) -> Result<()> {
        let folder = folder.to_path_buf();
        let id = id.clone();
        blocking(move || {
            MarkdownStore::open(folder)
                .and_then(|store| store.delete_task(&id))
                .with_context(|| format!("deleting {id}"))
        })
        .await
    }
}

impl RepoBackend for LocalBackend {
    type Error = Error;

    async fn check_repo(&self, folder: &Path) -> Result<bool> {
        let folder = folder.to_path_buf();
        blocking(move || GitRepo::is_repository(&folder).context("detecting repository")).await
    }

    async fn list_branches(&self, folder: &Path) -> Result<Vec<String>> {
        let folder = folder.to_path_buf();
        blocking(move || open_repo(folder)?.branches().context("listing branches")).await
    }

    async fn current_branch(&self, folder: &Path) -> Result<String> {
        let folder = folder.to_path_buf();
        blocking(move || open_repo(folder)?.current_branch().context("reading HEAD")).await
    }

    async fn sync(&self, folder: &Path, branch: &str) -> Result<SyncResult> {
        let folder = folder.to_path_buf();
        let branch = branch.to_owned();
        blocking(move || {
            open_repo(folder)?
                .sync(&branch)
                .with_context(|| format!("syncing branch {branch}"))
        })
        .await
    }
}

fn open_repo(folder: PathBuf) -> Result<GitRepo> {
    let display = folder.display().to_string();
    GitRepo::open(folder).with_context(|| format!("opening repository for {display}"))
}
