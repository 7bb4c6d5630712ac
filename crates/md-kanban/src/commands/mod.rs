use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use md_kanban_app::{
    AppConfig, Board, DropOutcome, FileKeyValueStore, KeyValueStore, LocalBackend, Preferences, RepoPhase,
};
use md_kanban_core::{Due, SubTask, Task, TaskDraft, TaskStatus};
use md_kanban_store::MarkdownStore;
use tracing::debug;

use crate::Command;

mod render;

type LocalBoard<K> = Board<LocalBackend, LocalBackend, K>;

/// Load configuration and preferences, run `command`, and print its output.
pub async fn run(command: Command, folder: Option<PathBuf>, config_path: &Path, prefs_path: &Path) -> Result<()> {
    let mut config = AppConfig::load(config_path)?;
    // Every invocation reopens the board; syncing is left to `sync`.
    config.sync.auto_sync = false;
    let prefs = Preferences::new(FileKeyValueStore::open(prefs_path)?);
    let board = Board::new(LocalBackend, LocalBackend, prefs, &config);

    let output = execute(&board, command, folder).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn execute<K: KeyValueStore>(board: &LocalBoard<K>, command: Command, folder: Option<PathBuf>) -> Result<String> {
    match command {
        Command::Init { parent, name } => {
            let store = MarkdownStore::init(&parent, &name)?;
            let opened = open_folder(board, store.folder()).await?;
            Ok(format!("Created task folder {}", opened.display()))
        }

        Command::Close => {
            board.return_to_start()?;
            Ok("Closed the board".to_owned())
        }

        Command::Ls { sort } => {
            open_board(board, folder).await?;
            if let Some(sort) = sort {
                board.store().change_sort_option(sort);
            }
            Ok(render::board(&board.store().tasks()))
        }

        Command::New {
            title,
            status,
            priority,
            due,
            assignee,
            memo,
            subtasks,
        } => {
            open_board(board, folder).await?;
            let draft = TaskDraft {
                title,
                status,
                priority,
                due: due.as_deref().map(Due::parse),
                assignee,
                sub_tasks: subtasks.into_iter().map(SubTask::open).collect(),
                memo: memo.unwrap_or_default(),
            };
            create_task(board, draft).await
        }

        Command::Move { task, to } => {
            open_board(board, folder).await?;
            move_task(board, &task, &to).await
        }

        Command::Edit {
            task,
            title,
            priority,
            due,
            assignee,
            memo,
        } => {
            open_board(board, folder).await?;
            let tasks = board.store().tasks();
            let original = find_task(&tasks, &task)?;
            let mut edited = original.clone();
            edited.title = title.unwrap_or(edited.title);
            edited.priority = priority.unwrap_or(edited.priority);
            edited.due = due.as_deref().map_or(edited.due, Due::parse);
            edited.assignee = assignee.unwrap_or(edited.assignee);
            edited.memo = memo.unwrap_or(edited.memo);
            edit_task(board, original, edited).await
        }

        Command::Rm { task } => {
            open_board(board, folder).await?;
            let tasks = board.store().tasks();
            let task = find_task(&tasks, &task)?;
            board.delete(&task.id).await?;
            Ok(format!("Deleted {}", task.title))
        }

        Command::Sync { branch } => {
            let opened = open_board(board, folder).await?;
            sync(board, &opened, branch).await
        }

        Command::Branches { select } => {
            let opened = open_board(board, folder).await?;
            branches(board, &opened, select.as_deref())
        }
    }
}

async fn create_task<K: KeyValueStore>(board: &LocalBoard<K>, draft: TaskDraft) -> Result<String> {
    if !board.request_new_task() {
        bail!("a task is already being created");
    }
    let task = board.submit_new_task(draft).await?;
    Ok(format!("Created {} ({})", task.title, render::file_name(&task)))
}

/// Keyboard equivalent of dragging `key` onto `to`.
async fn move_task<K: KeyValueStore>(board: &LocalBoard<K>, key: &str, to: &str) -> Result<String> {
    let tasks = board.store().tasks();
    let task = find_task(&tasks, key)?;
    let target = drop_target(&tasks, to)?;
    let drag = board.drag();
    if !drag.start(&task.id) {
        bail!("{} is no longer on the board", render::file_name(task));
    }
    drag.over(&target);
    match drag.end(Some(&target)).await? {
        DropOutcome::Moved(status) => Ok(format!("Moved {} to {}", task.title, status.label())),
        DropOutcome::Unchanged => Ok(format!("{} is already in {}", task.title, task.status.label())),
        DropOutcome::Cancelled | DropOutcome::NotDragging => bail!("cannot drop onto {to}"),
    }
}

async fn edit_task<K: KeyValueStore>(board: &LocalBoard<K>, original: &Task, edited: Task) -> Result<String> {
    if edited == *original {
        return Ok("Nothing to change".to_owned());
    }
    let title = edited.title.clone();
    board.edit(edited).await?;
    Ok(format!("Updated {title}"))
}

async fn sync<K: KeyValueStore>(board: &LocalBoard<K>, folder: &Path, branch: Option<String>) -> Result<String> {
    let git = board.git();
    if git.phase() != RepoPhase::Ready {
        bail!("{} is not inside a git repository", folder.display());
    }
    let branch = branch.unwrap_or_else(|| git.preferred_branch());
    let result = git.sync(&branch).await.context("a sync is already running")?;
    if result.conflicts {
        bail!("{}", result.message);
    }
    Ok(result.message)
}

fn branches<K: KeyValueStore>(board: &LocalBoard<K>, folder: &Path, select: Option<&str>) -> Result<String> {
    let git = board.git();
    if git.phase() != RepoPhase::Ready {
        bail!("{} is not inside a git repository", folder.display());
    }
    if let Some(branch) = select {
        git.select_branch(branch)?;
        return Ok(format!("Sync branch set to {branch}"));
    }
    Ok(render::branches(
        &git.branches(),
        git.current_branch().as_deref(),
        &git.preferred_branch(),
    ))
}

/// Open `folder`, else the remembered folder, else the current directory.
async fn open_board<K: KeyValueStore>(board: &LocalBoard<K>, folder: Option<PathBuf>) -> Result<PathBuf> {
    let folder = folder
        .or_else(|| board.preferences().last_folder())
        .unwrap_or_else(|| PathBuf::from("."));
    open_folder(board, &folder).await
}

async fn open_folder<K: KeyValueStore>(board: &LocalBoard<K>, folder: &Path) -> Result<PathBuf> {
    let folder =
        fs::canonicalize(folder).with_context(|| format!("task folder {} does not exist", folder.display()))?;
    debug!(folder = %folder.display(), "Opening board");
    board.open(folder.clone()).await?;
    Ok(folder)
}

/// Find a task by id, file name, or file stem.
fn find_task<'a>(tasks: &'a [Task], key: &str) -> Result<&'a Task> {
    tasks
        .iter()
        .find(|task| task.id.as_str() == key)
        .or_else(|| {
            tasks.iter().find(|task| {
                let path = task.id.as_path();
                path.file_name().is_some_and(|name| name == key) || path.file_stem().is_some_and(|stem| stem == key)
            })
        })
        .with_context(|| format!("no task matches {key}"))
}

/// Drop target id for `key`: a column wire name, or the id of a task.
fn drop_target(tasks: &[Task], key: &str) -> Result<String> {
    if let Ok(status) = key.parse::<TaskStatus>() {
        return Ok(status.as_str().to_owned());
    }
    find_task(tasks, key)
        .map(|task| task.id.as_str().to_owned())
        .with_context(|| format!("{key} is neither a column nor a task"))
}
