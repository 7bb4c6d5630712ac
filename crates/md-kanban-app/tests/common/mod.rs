//! In-memory backends for driving the board without a filesystem.
//!
//! Every backend call can be held at a gate so tests can observe the board
//! while a call is in flight.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use anyhow::{Result, anyhow};
use md_kanban_app::{AppConfig, Board, MemoryKeyValueStore, Preferences, RepoBackend, TaskBackend, TaskStore};
use md_kanban_core::{Due, Priority, SyncResult, Task, TaskDraft, TaskId, TaskStatus, Timestamp};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const FOLDER: &str = "/boards/work";
pub const OTHER_FOLDER: &str = "/boards/home";

pub type TestBoard = Board<MockTasks, MockRepo, MemoryKeyValueStore>;

/// Stored task with a fixed creation stamp.
pub fn task(id: &str, status: TaskStatus, created: &str) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("Task {id}"),
        created: Timestamp::new(created),
        updated: Timestamp::new(created),
        status,
        priority: Priority::Medium,
        due: Due::Unset,
        assignee: "-".to_owned(),
        sub_tasks: Vec::new(),
        memo: String::new(),
    }
}

/// Three tasks, one per column, newest last.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        task("a.md", TaskStatus::NotStarted, "2024-01-01-09:00"),
        task("b.md", TaskStatus::InProgress, "2024-01-02-09:00"),
        task("c.md", TaskStatus::Done, "2024-01-03-09:00"),
    ]
}

pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

/// Store over `backend`, activated on [`FOLDER`] and loaded once.
pub async fn loaded_store(backend: &MockTasks) -> Arc<TaskStore<MockTasks>> {
    let store = Arc::new(TaskStore::new(backend.clone(), &AppConfig::default().board));
    store.activate(FOLDER);
    store.load().await.expect("initial load");
    store
}

pub fn board(tasks: &MockTasks, repo: &MockRepo, config: &AppConfig) -> TestBoard {
    Board::new(
        tasks.clone(),
        repo.clone(),
        Preferences::new(MemoryKeyValueStore::new()),
        config,
    )
}

/// Per-operation gates. A held operation waits for one `notify_one` per call.
#[derive(Default)]
struct Gates(Mutex<HashMap<&'static str, Arc<Notify>>>);

impl Gates {
    fn hold(&self, op: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.0.lock().unwrap().insert(op, Arc::clone(&gate));
        gate
    }

    async fn pass(&self, op: &'static str) {
        let gate = self.0.lock().unwrap().get(op).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[derive(Default)]
struct TasksInner {
    tasks: Mutex<Vec<Task>>,
    saved: Mutex<Vec<Task>>,
    failing: Mutex<HashSet<&'static str>>,
    loads: AtomicUsize,
    early_snapshot: AtomicBool,
    minted: AtomicUsize,
    gates: Gates,
}

/// Task backend holding its collection in memory.
#[derive(Clone, Default)]
pub struct MockTasks(Arc<TasksInner>);

impl MockTasks {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::default();
        backend.set_tasks(tasks);
        backend
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.0.tasks.lock().unwrap() = tasks;
    }

    /// What the backend currently holds.
    pub fn stored(&self) -> Vec<Task> {
        self.0.tasks.lock().unwrap().clone()
    }

    pub fn stored_task(&self, id: &str) -> Option<Task> {
        self.stored().into_iter().find(|task| task.id.as_str() == id)
    }

    /// Every task passed to `save`, in arrival order.
    pub fn saved(&self) -> Vec<Task> {
        self.0.saved.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.0.loads.load(Ordering::SeqCst)
    }

    pub fn fail(&self, op: &'static str) {
        self.0.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.0.failing.lock().unwrap().remove(op);
    }

    pub fn hold(&self, op: &'static str) -> Arc<Notify> {
        self.0.gates.hold(op)
    }

    /// Make `load` read its answer before waiting at the gate.
    pub fn snapshot_before_gate(&self) {
        self.0.early_snapshot.store(true, Ordering::SeqCst);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.0.failing.lock().unwrap().contains(op) {
            return Err(anyhow!("mock {op} failure"));
        }
        Ok(())
    }
}

impl TaskBackend for MockTasks {
    type Error = anyhow::Error;

    async fn load(&self, _folder: &Path) -> Result<Vec<Task>> {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
        let early = self.0.early_snapshot.load(Ordering::SeqCst).then(|| self.stored());
        self.0.gates.pass("load").await;
        self.check("load")?;
        Ok(early.unwrap_or_else(|| self.stored()))
    }

    async fn save(&self, _folder: &Path, task: &Task) -> Result<()> {
        self.0.saved.lock().unwrap().push(task.clone());
        self.0.gates.pass("save").await;
        self.check("save")?;
        let mut tasks = self.0.tasks.lock().unwrap();
        let slot = tasks
            .iter_mut()
            .find(|held| held.id == task.id)
            .ok_or_else(|| anyhow!("no such task: {}", task.id))?;
        slot.clone_from(task);
        Ok(())
    }

    async fn create(&self, _folder: &Path, draft: &TaskDraft) -> Result<Task> {
        self.0.gates.pass("create").await;
        self.check("create")?;
        let n = self.0.minted.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = task(
            &format!("created-{n}.md"),
            draft.status.unwrap_or(TaskStatus::NotStarted),
            "2030-01-01-00:00",
        );
        created.title.clone_from(&draft.title);
        self.0.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, _folder: &Path, id: &TaskId) -> Result<()> {
        self.0.gates.pass("delete").await;
        self.check("delete")?;
        let mut tasks = self.0.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        if tasks.len() == before {
            return Err(anyhow!("no such task: {id}"));
        }
        Ok(())
    }
}

struct RepoInner {
    is_repo: bool,
    check_fails: AtomicBool,
    branches: Vec<String>,
    current: String,
    outcome: Mutex<Result<SyncResult, String>>,
    synced: Mutex<Vec<String>>,
    lookups: AtomicUsize,
    gates: Gates,
}

/// Repository backend with scripted answers.
#[derive(Clone)]
pub struct MockRepo(Arc<RepoInner>);

pub fn no_changes() -> SyncResult {
    SyncResult {
        pulled: false,
        pushed: false,
        conflicts: false,
        message: "No changes.".to_owned(),
    }
}

impl MockRepo {
    /// A repository with `branches`, currently on `current`.
    pub fn repository(branches: &[&str], current: &str) -> Self {
        Self::build(true, branches, current)
    }

    /// A folder outside any repository.
    pub fn plain() -> Self {
        Self::build(false, &[], "")
    }

    fn build(is_repo: bool, branches: &[&str], current: &str) -> Self {
        Self(Arc::new(RepoInner {
            is_repo,
            check_fails: AtomicBool::new(false),
            branches: branches.iter().map(|&name| name.to_owned()).collect(),
            current: current.to_owned(),
            outcome: Mutex::new(Ok(no_changes())),
            synced: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            gates: Gates::default(),
        }))
    }

    pub fn fail_detection(&self) {
        self.0.check_fails.store(true, Ordering::SeqCst);
    }

    /// Answer subsequent syncs with `outcome`; `Err` makes the call fail.
    pub fn answer(&self, outcome: Result<SyncResult, &str>) {
        *self.0.outcome.lock().unwrap() = outcome.map_err(str::to_owned);
    }

    /// Branches passed to `sync`, in call order.
    pub fn synced(&self) -> Vec<String> {
        self.0.synced.lock().unwrap().clone()
    }

    /// Number of branch-list and current-branch lookups.
    pub fn lookups(&self) -> usize {
        self.0.lookups.load(Ordering::SeqCst)
    }

    pub fn hold(&self, op: &'static str) -> Arc<Notify> {
        self.0.gates.hold(op)
    }
}

impl RepoBackend for MockRepo {
    type Error = anyhow::Error;

    async fn check_repo(&self, _folder: &Path) -> Result<bool> {
        self.0.gates.pass("check").await;
        if self.0.check_fails.load(Ordering::SeqCst) {
            return Err(anyhow!("mock detection failure"));
        }
        Ok(self.0.is_repo)
    }

    async fn list_branches(&self, _folder: &Path) -> Result<Vec<String>> {
        self.0.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.branches.clone())
    }

    async fn current_branch(&self, _folder: &Path) -> Result<String> {
        self.0.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.current.clone())
    }

    async fn sync(&self, _folder: &Path, branch: &str) -> Result<SyncResult> {
        self.0.synced.lock().unwrap().push(branch.to_owned());
        self.0.gates.pass("sync").await;
        self.0.outcome.lock().unwrap().clone().map_err(|message| anyhow!(message))
    }
}
