//! Repository detection and the sync message lifecycle.

use md_kanban_core::{GitSettings, SyncResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::backend::{RepoBackend, TaskBackend, describe};
use crate::config::SyncConfig;
use crate::error::BoardError;
use crate::notice::{Notice, NoticeSlot};
use crate::preferences::{KeyValueStore, Preferences};
use crate::scope::{Scope, ScopeSlot};
use crate::store::TaskStore;

/// Repository state of the active folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepoPhase {
    /// No folder is active.
    #[default]
    Inactive,
    /// Detection is in flight.
    Checking,
    /// The folder is not inside a repository; sync is unavailable.
    NotRepo,
    /// Branches are known and sync may run.
    Ready,
}

#[derive(Default)]
struct SyncState {
    scope: ScopeSlot,
    phase: RepoPhase,
    syncing: bool,
    branches: Vec<String>,
    current_branch: Option<String>,
    auto_synced: bool,
    last_result: Option<SyncResult>,
    message: NoticeSlot,
    picker_open: bool,
}

/// Drives repository detection, branch choice, and sync for the active folder.
///
/// Each activation syncs automatically at most once, on the first time
/// detection reaches [`RepoPhase::Ready`]. The result message of a sync
/// stays visible until its deadline passes.
pub struct GitSyncCoordinator<R, B, K> {
    repo: R,
    store: Arc<TaskStore<B>>,
    prefs: Preferences<K>,
    config: SyncConfig,
    state: Mutex<SyncState>,
}

impl<R, B, K> GitSyncCoordinator<R, B, K>
where
    R: RepoBackend,
    B: TaskBackend,
    K: KeyValueStore,
{
    /// Coordinator that reloads `store` after pulling remote changes.
    pub fn new(repo: R, store: Arc<TaskStore<B>>, prefs: Preferences<K>, config: SyncConfig) -> Self {
        Self {
            repo,
            store,
            prefs,
            config,
            state: Mutex::new(SyncState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new activation for `folder`. Resets the auto-sync guard.
    pub fn activate(&self, folder: impl Into<PathBuf>) -> Scope {
        let mut state = self.lock();
        let scope = state.scope.activate(folder.into());
        state.phase = RepoPhase::Checking;
        state.syncing = false;
        state.branches.clear();
        state.current_branch = None;
        state.auto_synced = false;
        state.last_result = None;
        state.message.clear();
        state.picker_open = false;
        scope
    }

    /// End the current activation; late results are ignored afterwards.
    pub fn deactivate(&self) {
        let mut state = self.lock();
        state.scope.deactivate();
        state.phase = RepoPhase::Inactive;
        state.syncing = false;
        state.picker_open = false;
        state.message.clear();
    }

    /// Repository state.
    pub fn phase(&self) -> RepoPhase {
        self.lock().phase
    }

    /// Whether a sync is in flight.
    pub fn is_syncing(&self) -> bool {
        self.lock().syncing
    }

    /// Branches offered for sync.
    pub fn branches(&self) -> Vec<String> {
        self.lock().branches.clone()
    }

    /// Branch checked out when detection ran.
    pub fn current_branch(&self) -> Option<String> {
        self.lock().current_branch.clone()
    }

    /// Outcome of the most recent sync of this activation.
    pub fn last_result(&self) -> Option<SyncResult> {
        self.lock().last_result.clone()
    }

    /// Sync message, until its deadline passes.
    pub fn message(&self) -> Option<Notice> {
        self.lock().message.visible()
    }

    /// Clear the sync message if its deadline has passed.
    pub fn tick(&self) -> bool {
        self.lock().message.expire()
    }

    /// Branch sync uses: the stored preference, else the configured default.
    pub fn preferred_branch(&self) -> String {
        self.prefs
            .stored_git_settings()
            .map_or_else(|| self.config.default_branch.clone(), |settings| settings.sync_branch)
    }

    /// Check for a repository and, if there is one, fetch the branch list
    /// and current branch concurrently.
    ///
    /// Detection failures are logged and treated as "no repository" or "no
    /// branches". The first time an activation reaches
    /// [`RepoPhase::Ready`], a sync on the preferred branch runs before this
    /// returns.
    pub async fn detect(&self) -> RepoPhase {
        let scope = {
            let mut state = self.lock();
            let Some(scope) = state.scope.current().cloned() else {
                return RepoPhase::Inactive;
            };
            state.phase = RepoPhase::Checking;
            scope
        };

        let is_repo = match self.repo.check_repo(scope.folder()).await {
            Ok(found) => found,
            Err(err) => {
                warn!(folder = %scope.folder().display(), error = %describe(err), "Repository detection failed");
                false
            }
        };
        if !is_repo {
            let mut state = self.lock();
            if state.scope.is_current(&scope) {
                state.phase = RepoPhase::NotRepo;
            }
            return state.phase;
        }

        let (branches, current) = tokio::join!(
            self.repo.list_branches(scope.folder()),
            self.repo.current_branch(scope.folder())
        );
        let branches = branches.unwrap_or_else(|err| {
            warn!(error = %describe(err), "Failed to list branches");
            Vec::new()
        });
        let current = current
            .map_err(|err| warn!(error = %describe(err), "Failed to read current branch"))
            .ok();

        let auto_sync = {
            let mut state = self.lock();
            if !state.scope.is_current(&scope) {
                drop(state);
                debug!(folder = %scope.folder().display(), "Dropping stale detection result");
                return self.phase();
            }
            state.branches = branches;
            state.current_branch = current;
            state.phase = RepoPhase::Ready;
            let fire = self.config.auto_sync && !state.auto_synced;
            state.auto_synced = true;
            fire
        };
        info!(folder = %scope.folder().display(), "Repository ready");

        if auto_sync {
            let branch = self.preferred_branch();
            self.sync(&branch).await;
        }
        RepoPhase::Ready
    }

    /// Sync the active folder against `branch`.
    ///
    /// Ignored (returns `None`) unless the repository is ready and no sync
    /// is in flight. Backend failures become a [`SyncResult`] carrying the
    /// error message. When remote changes were pulled, the task store is
    /// reloaded before this returns.
    pub async fn sync(&self, branch: &str) -> Option<SyncResult> {
        let scope = {
            let mut state = self.lock();
            let scope = state.scope.current().cloned()?;
            if state.phase != RepoPhase::Ready || state.syncing {
                drop(state);
                debug!(branch, "Sync rejected; repository busy or unavailable");
                return None;
            }
            state.syncing = true;
            state.message.clear();
            scope
        };

        let result = self
            .repo
            .sync(scope.folder(), branch)
            .await
            .unwrap_or_else(|err| {
                let message = describe(err);
                warn!(branch, error = %message, "Sync failed");
                SyncResult::failed(message)
            });

        {
            let mut state = self.lock();
            if !state.scope.is_current(&scope) {
                drop(state);
                debug!(branch, "Dropping stale sync result");
                return None;
            }
            state.syncing = false;
            state.last_result = Some(result.clone());
            state.message.show(result.message.clone(), self.config.message_ttl());
        }
        info!(branch, pulled = result.pulled, pushed = result.pushed, conflicts = result.conflicts, "Sync finished");

        if result.pulled
            && let Err(err) = self.store.load().await
        {
            debug!(error = %err, "Reload after pull failed");
        }
        Some(result)
    }

    /// Whether the branch picker is showing.
    pub fn is_picker_open(&self) -> bool {
        self.lock().picker_open
    }

    /// Show the branch picker. Only possible while the repository is ready.
    pub fn open_branch_picker(&self) -> bool {
        let mut state = self.lock();
        state.picker_open = state.phase == RepoPhase::Ready;
        state.picker_open
    }

    /// Hide the branch picker.
    pub fn close_branch_picker(&self) {
        self.lock().picker_open = false;
    }

    /// Store `branch` as the sync branch and close the picker.
    ///
    /// # Errors
    /// Returns [`BoardError::Preferences`] when the preference cannot be written.
    pub fn select_branch(&self, branch: &str) -> Result<(), BoardError> {
        self.prefs
            .set_git_settings(&GitSettings {
                sync_branch: branch.to_owned(),
            })
            .map_err(|err| BoardError::Preferences(format!("{err:#}")))?;
        self.close_branch_picker();
        info!(branch, "Selected sync branch");
        Ok(())
    }
}
