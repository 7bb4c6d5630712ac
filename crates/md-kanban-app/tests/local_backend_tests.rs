//! The board wired to Markdown files on disk.

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use git2::{Repository, RepositoryInitOptions};
use md_kanban_app::{
    AppConfig, Board, DropOutcome, LocalBackend, MemoryKeyValueStore, Preferences, RepoPhase, SyncConfig,
};
use md_kanban_core::{Priority, TaskDraft, TaskStatus};
use md_kanban_store::MarkdownStore;
use tempfile::TempDir;

type LocalBoard = Board<LocalBackend, LocalBackend, MemoryKeyValueStore>;

fn local_board(config: &AppConfig) -> LocalBoard {
    Board::new(
        LocalBackend,
        LocalBackend,
        Preferences::new(MemoryKeyValueStore::new()),
        config,
    )
}

#[tokio::test]
async fn tasks_round_trip_through_the_folder() -> Result<()> {
    let dir = TempDir::new()?;
    let store = MarkdownStore::init(dir.path(), "tasks")?;
    let folder = store.folder().to_path_buf();
    let board = local_board(&AppConfig::default());

    board.open(folder.clone()).await?;
    assert!(board.store().tasks().is_empty());
    assert_eq!(board.git().phase(), RepoPhase::NotRepo);

    assert!(board.request_new_task());
    let created = board
        .submit_new_task(TaskDraft::titled("Write docs").with_priority(Priority::High))
        .await?;
    assert_eq!(board.store().tasks().len(), 1);

    assert!(board.drag().start(&created.id));
    assert_eq!(board.drag().end(Some("done")).await?, DropOutcome::Moved(TaskStatus::Done));

    let on_disk = store.load_tasks()?;
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].title, "Write docs");
    assert_eq!(on_disk[0].status, TaskStatus::Done);
    assert_eq!(on_disk[0].priority, Priority::High);

    board.delete(&created.id).await?;
    assert!(board.store().tasks().is_empty());
    assert!(store.load_tasks()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_folder_fails_to_load() -> Result<()> {
    let dir = TempDir::new()?;
    let board = local_board(&AppConfig::default());

    let result = board.open(dir.path().join("gone")).await;

    assert!(result.is_err_and(|err| err.to_string().contains("gone")));
    Ok(())
}

#[tokio::test]
async fn folder_inside_a_repository_is_ready() -> Result<()> {
    let dir = TempDir::new()?;
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(dir.path(), &opts)?;
    let store = MarkdownStore::init(dir.path(), "tasks")?;
    let config = AppConfig {
        sync: SyncConfig {
            auto_sync: false,
            ..SyncConfig::default()
        },
        ..AppConfig::default()
    };
    let board = local_board(&config);

    board.open(store.folder().to_path_buf()).await?;

    assert_eq!(board.git().phase(), RepoPhase::Ready);
    assert_eq!(board.git().current_branch().as_deref(), Some("main"));
    assert!(board.git().branches().is_empty());
    Ok(())
}
