//! Drag-and-drop status transitions with a speculative preview.

use md_kanban_core::{Task, TaskId, TaskStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::backend::TaskBackend;
use crate::error::BoardError;
use crate::geometry::{CollisionDetector, Rect};
use crate::store::TaskStore;

/// Where the drag interaction stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A task is being dragged.
    Dragging {
        /// Dragged task.
        task: TaskId,
        /// Its status when the drag started.
        original: TaskStatus,
    },
}

/// What a drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// `end` was called without a drag in progress.
    NotDragging,
    /// Dropped outside any valid target; nothing was saved.
    Cancelled,
    /// Dropped onto the task's own column; nothing was saved.
    Unchanged,
    /// The task was saved under a new status.
    Moved(TaskStatus),
}

#[derive(Default)]
struct DragInner {
    state: DragState,
    overlay: Option<Vec<Task>>,
}

/// Drives drag interactions over a [`TaskStore`].
///
/// Drop targets are identified by string ids: a column id is the status
/// wire name (`not-started`, `in-progress`, `done`); any other id names a
/// task, whose current status is the target. While hovering, a preview
/// copy of the board shows the dragged task in the candidate column. The
/// preview is rebuilt from the store on every change and discarded when the
/// drag ends; only a drop onto a different column reaches the store.
pub struct DragDropCoordinator<B> {
    store: Arc<TaskStore<B>>,
    inner: Mutex<DragInner>,
}

impl<B: TaskBackend> DragDropCoordinator<B> {
    /// Coordinator over `store`.
    pub fn new(store: Arc<TaskStore<B>>) -> Self {
        Self {
            store,
            inner: Mutex::new(DragInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DragInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current drag state.
    pub fn state(&self) -> DragState {
        self.lock().state.clone()
    }

    /// Board as it should be displayed: the preview while one exists,
    /// otherwise the store's collection.
    pub fn view(&self) -> Vec<Task> {
        let overlay = self.lock().overlay.clone();
        overlay.unwrap_or_else(|| self.store.tasks())
    }

    /// Begin dragging `id`. Returns false if the task is not on the board.
    pub fn start(&self, id: &TaskId) -> bool {
        let Some(task) = self.store.task(id) else {
            debug!(task = %id, "Ignoring drag start for unknown task");
            return false;
        };
        let mut inner = self.lock();
        inner.state = DragState::Dragging {
            task: task.id,
            original: task.status,
        };
        inner.overlay = None;
        true
    }

    /// Hover over `target`. Returns true if the preview changed.
    pub fn over(&self, target: &str) -> bool {
        let canonical = self.store.tasks();
        let mut inner = self.lock();
        let DragState::Dragging { task: dragged, .. } = &inner.state else {
            return false;
        };
        let dragged = dragged.clone();
        let view = inner.overlay.as_deref().unwrap_or(&canonical);
        let Some(status) = resolve_target(target, view) else {
            debug!(target, "Hover target did not resolve");
            return false;
        };
        let shown = view.iter().find(|task| task.id == dragged).map(|task| task.status);
        if shown == Some(status) {
            return false;
        }
        inner.overlay = Some(
            canonical
                .iter()
                .map(|task| if task.id == dragged { task.with_status(status) } else { task.clone() })
                .collect(),
        );
        true
    }

    /// Drop onto `target`, or outside any target when `None`.
    ///
    /// The drag is over and the preview discarded before the store is
    /// called, whatever the save's outcome.
    ///
    /// # Errors
    /// Propagates the store's save error for a move to a new column.
    pub async fn end(&self, target: Option<&str>) -> Result<DropOutcome, BoardError> {
        let canonical = self.store.tasks();
        let (dragged, original, resolved) = {
            let mut inner = self.lock();
            let DragState::Dragging { task, original } = std::mem::take(&mut inner.state) else {
                inner.overlay = None;
                return Ok(DropOutcome::NotDragging);
            };
            let overlay = inner.overlay.take();
            let view = overlay.as_deref().unwrap_or(&canonical);
            let resolved = target.and_then(|target| resolve_target(target, view));
            (task, original, resolved)
        };

        match resolved {
            None => {
                debug!(task = %dragged, "Drop outside any target");
                Ok(DropOutcome::Cancelled)
            }
            Some(status) if status == original => {
                debug!(task = %dragged, "Dropped onto its own column");
                Ok(DropOutcome::Unchanged)
            }
            Some(status) => {
                let task = canonical
                    .into_iter()
                    .find(|task| task.id == dragged)
                    .ok_or(BoardError::UnknownTask(dragged))?;
                self.store.save(task.with_status(status)).await?;
                Ok(DropOutcome::Moved(status))
            }
        }
    }

    /// Abandon any drag in progress without saving.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.state = DragState::Idle;
        inner.overlay = None;
    }

    /// [`Self::over`] with the target chosen by `detector`.
    pub fn over_at(&self, detector: &impl CollisionDetector, dragged: &Rect) -> bool {
        detector.resolve(dragged).is_some_and(|target| self.over(target))
    }

    /// [`Self::end`] with the target chosen by `detector`.
    ///
    /// # Errors
    /// Propagates the store's save error.
    pub async fn end_at(&self, detector: &impl CollisionDetector, dragged: &Rect) -> Result<DropOutcome, BoardError> {
        let target = detector.resolve(dragged).map(str::to_owned);
        self.end(target.as_deref()).await
    }
}

/// Status named by a drop target id within `view`.
fn resolve_target(target: &str, view: &[Task]) -> Option<TaskStatus> {
    if let Some(status) = TaskStatus::ALL.into_iter().find(|status| status.as_str() == target) {
        return Some(status);
    }
    view.iter().find(|task| task.id.as_str() == target).map(|task| task.status)
}
