//! Board orchestration: folder lifecycle, creation gate, and inbound commands.

use md_kanban_core::{Task, TaskDraft, TaskId};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info};

use crate::backend::{RepoBackend, TaskBackend};
use crate::config::AppConfig;
use crate::drag::DragDropCoordinator;
use crate::error::BoardError;
use crate::git_sync::GitSyncCoordinator;
use crate::preferences::{KeyValueStore, Preferences};
use crate::store::TaskStore;

/// Request delivered from outside the board, e.g. an application menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    /// Open the new-task form.
    NewTask,
}

/// Sending half of the command channel.
pub type CommandSender = UnboundedSender<BoardCommand>;
/// Receiving half of the command channel.
pub type CommandReceiver = UnboundedReceiver<BoardCommand>;

/// Channel for delivering [`BoardCommand`]s to [`Board::handle_command`].
#[must_use]
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    unbounded_channel()
}

/// One open task board with its drag, sync, and creation surfaces.
pub struct Board<T, R, K> {
    store: Arc<TaskStore<T>>,
    drag: DragDropCoordinator<T>,
    git: GitSyncCoordinator<R, T, K>,
    prefs: Preferences<K>,
    creating: AtomicBool,
}

impl<T, R, K> Board<T, R, K>
where
    T: TaskBackend,
    R: RepoBackend,
    K: KeyValueStore,
{
    /// Wire up a board with no folder open.
    pub fn new(tasks: T, repo: R, prefs: Preferences<K>, config: &AppConfig) -> Self {
        let store = Arc::new(TaskStore::new(tasks, &config.board));
        Self {
            drag: DragDropCoordinator::new(Arc::clone(&store)),
            git: GitSyncCoordinator::new(repo, Arc::clone(&store), prefs.clone(), config.sync.clone()),
            store,
            prefs,
            creating: AtomicBool::new(false),
        }
    }

    /// The canonical task collection.
    pub fn store(&self) -> &TaskStore<T> {
        &self.store
    }

    /// Drag-and-drop surface.
    pub const fn drag(&self) -> &DragDropCoordinator<T> {
        &self.drag
    }

    /// Repository sync surface.
    pub const fn git(&self) -> &GitSyncCoordinator<R, T, K> {
        &self.git
    }

    /// Durable preferences.
    pub const fn preferences(&self) -> &Preferences<K> {
        &self.prefs
    }

    /// Open `folder` as the active board.
    ///
    /// Remembers the folder, starts a new activation, resets the transient
    /// surfaces, then loads tasks and runs repository detection (with its
    /// single automatic sync) concurrently.
    ///
    /// # Errors
    /// Returns [`BoardError::Preferences`] if the folder cannot be
    /// remembered and [`BoardError::Load`] if the initial load fails.
    pub async fn open(&self, folder: impl Into<PathBuf>) -> Result<(), BoardError> {
        let folder = folder.into();
        self.prefs
            .set_last_folder(&folder)
            .map_err(|err| BoardError::Preferences(format!("{err:#}")))?;
        self.reset_transient();
        self.store.activate(folder.clone());
        self.git.activate(folder.clone());
        info!(folder = %folder.display(), "Opened board");

        let (loaded, phase) = tokio::join!(self.store.load(), self.git.detect());
        debug!(?phase, "Repository detection finished");
        loaded
    }

    /// Reopen the last folder, if one is remembered. Returns whether a
    /// folder was opened.
    ///
    /// # Errors
    /// Propagates [`Self::open`] errors.
    pub async fn resume(&self) -> Result<bool, BoardError> {
        let Some(folder) = self.prefs.last_folder() else {
            return Ok(false);
        };
        self.open(folder).await?;
        Ok(true)
    }

    /// Close the board and forget the last folder.
    ///
    /// # Errors
    /// Returns [`BoardError::Preferences`] if the preference cannot be cleared.
    pub fn return_to_start(&self) -> Result<(), BoardError> {
        self.reset_transient();
        self.store.deactivate();
        self.git.deactivate();
        self.prefs
            .clear_last_folder()
            .map_err(|err| BoardError::Preferences(format!("{err:#}")))?;
        info!("Returned to start");
        Ok(())
    }

    fn reset_transient(&self) {
        self.creating.store(false, Ordering::SeqCst);
        self.drag.cancel();
        self.git.close_branch_picker();
    }

    /// Open the new-task form. Returns false if it is already open.
    pub fn request_new_task(&self) -> bool {
        let opened = self
            .creating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !opened {
            debug!("New-task form already open");
        }
        opened
    }

    /// Whether the new-task form is open.
    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::SeqCst)
    }

    /// Close the new-task form without creating anything.
    pub fn cancel_new_task(&self) {
        self.creating.store(false, Ordering::SeqCst);
    }

    /// Create a task from the form and close it.
    ///
    /// The form stays open if creation fails.
    ///
    /// # Errors
    /// Propagates [`TaskStore::create`] errors.
    pub async fn submit_new_task(&self, draft: TaskDraft) -> Result<Task, BoardError> {
        let task = self.store.create(draft).await?;
        self.creating.store(false, Ordering::SeqCst);
        Ok(task)
    }

    /// Route an inbound command. Returns whether it changed anything.
    pub fn handle_command(&self, command: BoardCommand) -> bool {
        match command {
            BoardCommand::NewTask => self.request_new_task(),
        }
    }

    /// Handle every command already queued on `commands`.
    pub fn drain_commands(&self, commands: &mut CommandReceiver) -> usize {
        let mut handled = 0;
        while let Ok(command) = commands.try_recv() {
            self.handle_command(command);
            handled += 1;
        }
        handled
    }

    /// Commit an edit made in the detail view.
    ///
    /// # Errors
    /// Propagates [`TaskStore::save`] errors.
    pub async fn edit(&self, task: Task) -> Result<(), BoardError> {
        self.store.save(task).await
    }

    /// Remove a task.
    ///
    /// # Errors
    /// Propagates [`TaskStore::delete`] errors.
    pub async fn delete(&self, id: &TaskId) -> Result<(), BoardError> {
        self.store.delete(id).await
    }
}
