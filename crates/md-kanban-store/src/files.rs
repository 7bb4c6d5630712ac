use md_kanban_core::timestamp::{local_now, today};
use md_kanban_core::{Due, Priority, Task, TaskDraft, TaskId, TaskStatus, Timestamp, UNSET};
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::markdown::{parse_task, render_task};

/// Template copied into every new task folder.
pub const TEMPLATE_FILE: &str = "template.md";
/// Naming guide copied into every new task folder.
pub const NAMING_GUIDE_FILE: &str = "task-naming.md";

const TEMPLATE: &str = include_str!("../resources/template.md");
const NAMING_GUIDE: &str = include_str!("../resources/task-naming.md");

/// Folder of markdown task files, one task per file.
///
/// A task's identifier is the path of its file. The handle holds no task
/// state; every call goes to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownStore {
    folder: PathBuf,
}

impl MarkdownStore {
    /// Open an existing task folder.
    ///
    /// # Errors
    /// Returns an error if `folder` is not a directory.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let folder = folder.into();
        if !folder.is_dir() {
            return Err(StoreError::FolderNotFound(folder.display().to_string()));
        }
        Ok(Self { folder })
    }

    /// Create `parent/name`, seed it with the template and naming guide, and
    /// open it.
    ///
    /// # Errors
    /// Returns an error if the name is invalid or already taken, or the
    /// folder cannot be written.
    pub fn init(parent: &Path, name: &str) -> Result<Self, StoreError> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::InvalidFolderName(name.to_owned()));
        }
        if !parent.is_dir() {
            return Err(StoreError::FolderNotFound(parent.display().to_string()));
        }
        let folder = parent.join(name);
        if folder.exists() {
            return Err(StoreError::FolderExists(folder.display().to_string()));
        }
        fs::create_dir(&folder)?;
        fs::write(folder.join(TEMPLATE_FILE), TEMPLATE)?;
        fs::write(folder.join(NAMING_GUIDE_FILE), NAMING_GUIDE)?;
        info!(folder = %folder.display(), "Created task folder");
        Ok(Self { folder })
    }

    /// Folder this store reads and writes.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Read every task file, ordered by file name.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    ///
    /// # Errors
    /// Returns an error if the folder has disappeared or cannot be listed.
    pub fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        if !self.folder.is_dir() {
            return Err(StoreError::FolderNotFound(self.folder.display().to_string()));
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if is_task_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tasks = Vec::with_capacity(paths.len());
        for path in paths {
            match read_task(&path) {
                Ok(task) => tasks.push(task),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable task file"),
            }
        }
        debug!(folder = %self.folder.display(), count = tasks.len(), "Loaded tasks");
        Ok(tasks)
    }

    /// Overwrite an existing task file with `task`.
    ///
    /// # Errors
    /// Returns an error for draft tasks, when the file no longer exists in
    /// this folder, or when writing fails.
    pub fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let path = self.existing_path(&task.id)?;
        fs::write(&path, render_task(task))?;
        debug!(task = %task.id, "Saved task");
        Ok(())
    }

    /// Write a new task file and return the stored task.
    ///
    /// The file is named `<title>_<YYYYmmddHHMMSS>.md`; a numeric suffix is
    /// added when that name is already taken.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn create_task(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let title = if draft.title.trim().is_empty() { UNSET } else { draft.title.trim() };
        let stamp = local_now()
            .format(format_description!("[year][month][day][hour][minute][second]"))
            .unwrap_or_default();
        let path = unique_path(&self.folder, &format!("{}_{stamp}", sanitize_file_stem(title)));

        let now = Timestamp::now();
        let task = Task {
            id: TaskId::new(path.to_string_lossy()),
            title: title.to_owned(),
            created: now.clone(),
            updated: now,
            status: draft.status.unwrap_or(TaskStatus::NotStarted),
            priority: draft.priority.unwrap_or(Priority::Low),
            due: draft.due.clone().unwrap_or_else(|| Due::parse(&today())),
            assignee: draft.assignee.clone().unwrap_or_else(|| UNSET.to_owned()),
            sub_tasks: draft.sub_tasks.clone(),
            memo: draft.memo.clone(),
        };
        fs::write(&path, render_task(&task))?;
        info!(task = %task.id, "Created task");
        Ok(task)
    }

    /// Remove a task file.
    ///
    /// # Errors
    /// Returns an error for draft tasks, missing files, or I/O failures.
    pub fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let path = self.existing_path(id)?;
        fs::remove_file(path)?;
        info!(task = %id, "Deleted task");
        Ok(())
    }

    /// Resolve `id` to a task file directly inside this folder.
    fn existing_path(&self, id: &TaskId) -> Result<PathBuf, StoreError> {
        if id.is_draft() {
            return Err(StoreError::DraftTask);
        }
        let not_found = || StoreError::TaskNotFound(id.to_string());
        let folder = fs::canonicalize(&self.folder).map_err(|_| not_found())?;
        let path = fs::canonicalize(id.as_path()).map_err(|_| not_found())?;
        if path.parent() != Some(folder.as_path()) || !is_task_file(&path) {
            return Err(not_found());
        }
        Ok(path)
    }
}

fn read_task(path: &Path) -> Result<Task, StoreError> {
    let content = fs::read_to_string(path)?;
    let id = TaskId::new(path.to_string_lossy());
    parse_task(id, &content).map_err(|err| StoreError::Parse {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

fn is_task_file(path: &Path) -> bool {
    let is_markdown = path.extension().is_some_and(|ext| ext == "md");
    let reserved = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == TEMPLATE_FILE || name == NAMING_GUIDE_FILE);
    is_markdown && !reserved && path.is_file()
}

/// Replace anything but letters, digits, `-` and `_` with `_`.
fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn unique_path(folder: &Path, stem: &str) -> PathBuf {
    let first = folder.join(format!("{stem}.md"));
    if !first.exists() {
        return first;
    }
    (1..u32::MAX)
        .map(|n| folder.join(format!("{stem}-{n}.md")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
