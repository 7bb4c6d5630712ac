//! Optimistic in-memory view of one folder's tasks.

use md_kanban_core::{SortOption, Task, TaskDraft, TaskId, TaskStatus, Timestamp, sort_in_place};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{TaskBackend, describe};
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::notice::{Notice, NoticeSlot};
use crate::scope::{Scope, ScopeSlot};

/// Progress of the most recent fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing in flight and the last fetch succeeded (or none was made).
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed; the previously held tasks are still shown.
    Error(String),
}

#[derive(Default)]
struct StoreState {
    scope: ScopeSlot,
    canonical: Vec<Task>,
    status: LoadStatus,
    sort: SortOption,
    notice: NoticeSlot,
    latest_load: u64,
    pending_writes: usize,
    reload_wanted: bool,
    write_queues: HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>,
}

impl StoreState {
    fn reset(&mut self) {
        self.canonical.clear();
        self.status = LoadStatus::Idle;
        self.notice.clear();
        self.pending_writes = 0;
        self.reload_wanted = false;
    }
}

/// Owner of the canonical task collection.
///
/// Edits are applied locally before they are persisted; creation and
/// deletion wait for the backend and then reload. All methods take `&self`
/// so that several operations can be in flight at once on a single-threaded
/// runtime. Results that arrive after the folder was closed or switched are
/// dropped.
pub struct TaskStore<B> {
    backend: B,
    notice_ttl: Duration,
    state: Mutex<StoreState>,
}

impl<B: TaskBackend> TaskStore<B> {
    /// Create an inactive store.
    pub fn new(backend: B, config: &BoardConfig) -> Self {
        Self {
            backend,
            notice_ttl: config.notice_ttl(),
            state: Mutex::new(StoreState {
                sort: config.default_sort,
                ..StoreState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new activation for `folder`, forgetting the previous collection.
    pub fn activate(&self, folder: impl Into<PathBuf>) -> Scope {
        let mut state = self.lock();
        let scope = state.scope.activate(folder.into());
        state.reset();
        drop(state);
        debug!(folder = %scope.folder().display(), generation = scope.generation(), "Activated task store");
        scope
    }

    /// End the current activation; late results are ignored afterwards.
    pub fn deactivate(&self) {
        let mut state = self.lock();
        state.scope.deactivate();
        state.reset();
    }

    /// Current activation, if a folder is open.
    pub fn scope(&self) -> Option<Scope> {
        self.lock().scope.current().cloned()
    }

    fn current_scope(&self) -> Result<Scope, BoardError> {
        self.scope().ok_or(BoardError::NoFolder)
    }

    fn is_current(&self, scope: &Scope) -> bool {
        self.lock().scope.is_current(scope)
    }

    /// Snapshot of the canonical collection in display order.
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().canonical.clone()
    }

    /// Tasks of one column, in display order.
    pub fn column(&self, status: TaskStatus) -> Vec<Task> {
        self.lock()
            .canonical
            .iter()
            .filter(|task| task.status == status)
            .cloned()
            .collect()
    }

    /// Look up a task by id.
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.lock().canonical.iter().find(|task| &task.id == id).cloned()
    }

    /// Progress of the most recent fetch.
    pub fn status(&self) -> LoadStatus {
        self.lock().status.clone()
    }

    /// Active ordering.
    pub fn sort_option(&self) -> SortOption {
        self.lock().sort
    }

    /// Transient error message from a failed save, create, or delete.
    pub fn notice(&self) -> Option<Notice> {
        self.lock().notice.visible()
    }

    /// Expire the transient notice if its deadline has passed.
    pub fn tick(&self) -> bool {
        self.lock().notice.expire()
    }

    /// Re-sort the held collection under `option` without fetching.
    pub fn change_sort_option(&self, option: SortOption) {
        let mut state = self.lock();
        state.sort = option;
        sort_in_place(&mut state.canonical, option);
        drop(state);
        debug!(sort = %option, "Changed sort option");
    }

    /// Replace the collection with the backend's.
    ///
    /// On failure the previously held tasks stay visible and the status
    /// records the error. A fetch that was overtaken by a newer one, or that
    /// finishes after the folder was closed, is discarded.
    ///
    /// # Errors
    /// Returns [`BoardError::NoFolder`] when no folder is open and
    /// [`BoardError::Load`] when the backend fails.
    pub async fn load(&self) -> Result<(), BoardError> {
        let (scope, ticket) = {
            let mut state = self.lock();
            let scope = state.scope.current().cloned().ok_or(BoardError::NoFolder)?;
            state.latest_load += 1;
            state.status = LoadStatus::Loading;
            (scope, state.latest_load)
        };

        let result = self.backend.load(scope.folder()).await;

        let mut state = self.lock();
        if !state.scope.is_current(&scope) || state.latest_load != ticket {
            drop(state);
            debug!(folder = %scope.folder().display(), "Dropping stale load result");
            return Ok(());
        }
        if state.pending_writes > 0 {
            // The fetch may predate a write; the last write to finish reloads.
            state.reload_wanted = true;
            drop(state);
            debug!(folder = %scope.folder().display(), "Deferring load result until writes finish");
            return Ok(());
        }
        match result {
            Ok(tasks) => {
                let mut tasks = without_invalid_ids(tasks);
                sort_in_place(&mut tasks, state.sort);
                let count = tasks.len();
                state.canonical = tasks;
                state.status = LoadStatus::Idle;
                drop(state);
                debug!(folder = %scope.folder().display(), count, "Loaded tasks");
                Ok(())
            }
            Err(err) => {
                let message = describe(err);
                state.status = LoadStatus::Error(message.clone());
                drop(state);
                warn!(folder = %scope.folder().display(), error = %message, "Failed to load tasks");
                Err(BoardError::Load(message))
            }
        }
    }

    /// Commit an edit.
    ///
    /// The task's `updated` stamp is rewritten and the canonical entry is
    /// replaced before the first suspension point, so readers see the edit
    /// immediately. Writes of the same task reach the backend in the order
    /// they were issued. A fetch still in flight when the edit is applied is
    /// discarded and repeated once the write lands. If the backend rejects
    /// the write, the board is reloaded from the backend and the error is
    /// also shown as a notice.
    ///
    /// # Errors
    /// Returns [`BoardError::MissingId`] for drafts,
    /// [`BoardError::UnknownTask`] for ids not on the board, and
    /// [`BoardError::Save`] when persistence fails.
    pub async fn save(&self, mut task: Task) -> Result<(), BoardError> {
        if task.is_draft() {
            return Err(BoardError::MissingId);
        }
        let (scope, queue) = {
            let mut state = self.lock();
            let scope = state.scope.current().cloned().ok_or(BoardError::NoFolder)?;
            let sort = state.sort;
            let Some(slot) = state.canonical.iter_mut().find(|held| held.id == task.id) else {
                return Err(BoardError::UnknownTask(task.id));
            };
            task.updated = Timestamp::now();
            slot.clone_from(&task);
            sort_in_place(&mut state.canonical, sort);
            let queue = Arc::clone(state.write_queues.entry(task.id.clone()).or_default());
            state.pending_writes += 1;
            if state.status == LoadStatus::Loading {
                state.latest_load += 1;
                state.reload_wanted = true;
            }
            (scope, queue)
        };

        let turn = queue.lock().await;
        let result = self.backend.save(scope.folder(), &task).await;
        drop(turn);
        self.release_queue(&task.id, queue);
        let reload_wanted = self.finish_write(&scope);

        match result {
            Ok(()) => {
                info!(task = %task.id, status = %task.status, "Saved task");
                if reload_wanted && let Err(err) = self.load().await {
                    debug!(error = %err, "Reload after save failed");
                }
                Ok(())
            }
            Err(err) => {
                let message = describe(err);
                warn!(task = %task.id, error = %message, "Save failed; reloading from backend");
                if self.is_current(&scope) {
                    if let Err(reload) = self.load().await {
                        debug!(error = %reload, "Reload after failed save also failed");
                    }
                    self.show_notice(&scope, BoardError::Save(message.clone()).to_string());
                }
                Err(BoardError::Save(message))
            }
        }
    }

    /// Count a write as finished; true when it was the last one and a fetch
    /// was discarded meanwhile.
    fn finish_write(&self, scope: &Scope) -> bool {
        let mut state = self.lock();
        if !state.scope.is_current(scope) {
            return false;
        }
        state.pending_writes = state.pending_writes.saturating_sub(1);
        if state.pending_writes == 0 && state.reload_wanted {
            state.reload_wanted = false;
            return true;
        }
        false
    }

    fn release_queue(&self, id: &TaskId, queue: Arc<tokio::sync::Mutex<()>>) {
        let mut state = self.lock();
        drop(queue);
        if state
            .write_queues
            .get(id)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            state.write_queues.remove(id);
        }
    }

    /// Ask the backend to mint a task, then reload.
    ///
    /// Returns the task as the backend stored it.
    ///
    /// # Errors
    /// Returns [`BoardError::NoFolder`] when no folder is open and
    /// [`BoardError::Create`] when the backend fails. A failed reload after
    /// a successful creation is reported through [`Self::status`] only.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, BoardError> {
        let scope = self.current_scope()?;
        match self.backend.create(scope.folder(), &draft).await {
            Ok(task) => {
                info!(task = %task.id, "Created task");
                if self.is_current(&scope)
                    && let Err(err) = self.load().await
                {
                    debug!(error = %err, "Reload after create failed");
                }
                Ok(task)
            }
            Err(err) => {
                let message = describe(err);
                warn!(error = %message, "Failed to create task");
                self.show_notice(&scope, BoardError::Create(message.clone()).to_string());
                Err(BoardError::Create(message))
            }
        }
    }

    /// Ask the backend to remove a task, then reload.
    ///
    /// The task stays on the board until the backend confirms.
    ///
    /// # Errors
    /// Returns [`BoardError::MissingId`] for drafts, [`BoardError::NoFolder`]
    /// when no folder is open, and [`BoardError::Delete`] when the backend
    /// fails.
    pub async fn delete(&self, id: &TaskId) -> Result<(), BoardError> {
        if id.is_draft() {
            return Err(BoardError::MissingId);
        }
        let scope = self.current_scope()?;
        match self.backend.delete(scope.folder(), id).await {
            Ok(()) => {
                info!(task = %id, "Deleted task");
                if self.is_current(&scope)
                    && let Err(err) = self.load().await
                {
                    debug!(error = %err, "Reload after delete failed");
                }
                Ok(())
            }
            Err(err) => {
                let message = describe(err);
                warn!(task = %id, error = %message, "Failed to delete task");
                self.show_notice(&scope, BoardError::Delete(message.clone()).to_string());
                Err(BoardError::Delete(message))
            }
        }
    }

    fn show_notice(&self, scope: &Scope, text: String) {
        let mut state = self.lock();
        if state.scope.is_current(scope) {
            state.notice.show(text, self.notice_ttl);
        }
    }
}

/// Drop drafts and repeated ids so the collection stays keyed by id.
fn without_invalid_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| {
            if task.is_draft() {
                warn!(title = %task.title, "Backend returned a task without an id; ignoring it");
                return false;
            }
            if !seen.insert(task.id.clone()) {
                warn!(task = %task.id, "Backend returned a duplicate id; keeping the first");
                return false;
            }
            true
        })
        .collect()
}
