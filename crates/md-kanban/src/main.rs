//! CLI entry point for md-kanban.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use md_kanban_core::{Priority, SortOption, TaskStatus};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Kanban board over a folder of Markdown task files.
#[derive(Parser, Debug)]
#[command(
    name = "md-kanban",
    version,
    about = "md-kanban: a kanban board over a folder of Markdown task files"
)]
struct Cli {
    /// Task folder (defaults to the last opened folder, else the current directory).
    #[arg(long, global = true)]
    folder: Option<PathBuf>,

    /// Configuration file (defaults to `<config dir>/md-kanban/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preferences file (defaults to `<config dir>/md-kanban/preferences.json`).
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board, one column per status.
    Ls {
        #[arg(long)]
        sort: Option<SortOption>,
    },

    /// Create a task.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        memo: Option<String>,
        #[arg(short = 's', long = "subtask")]
        subtasks: Vec<String>,
    },

    /// Move a task onto a column (status name) or onto another task's column.
    Move {
        #[arg(long)]
        task: String,
        #[arg(long)]
        to: String,
    },

    /// Change task fields.
    Edit {
        #[arg(long)]
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },

    /// Delete a task file.
    Rm {
        #[arg(long)]
        task: String,
    },

    /// Pull, commit, and push the folder.
    Sync {
        #[arg(long)]
        branch: Option<String>,
    },

    /// List branches, or choose the sync branch.
    Branches {
        #[arg(long)]
        select: Option<String>,
    },

    /// Create a task folder seeded with the template files.
    Init {
        #[arg(long)]
        parent: PathBuf,
        #[arg(long)]
        name: String,
    },

    /// Forget the last opened folder.
    Close,
}

fn main() -> Result<()> {
    let Cli {
        folder,
        config,
        prefs,
        cmd,
    } = Cli::parse();
    install_tracing();

    let config_path = config.map_or_else(|| default_path("config.toml"), Ok)?;
    let prefs_path = prefs.map_or_else(|| default_path("preferences.json"), Ok)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?
        .block_on(commands::run(cmd, folder, &config_path, &prefs_path))
}

/// `<config dir>/md-kanban/<file>`.
fn default_path(file: &str) -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("md-kanban").join(file))
        .context("could not determine the configuration directory; pass --config and --prefs")
}

fn install_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "md-kanban",
            "--folder",
            "/boards/work",
            "new",
            "--title",
            "Write docs",
            "--status",
            "in-progress",
            "--priority",
            "high",
            "--subtask",
            "outline",
            "-s",
            "draft",
        ]);

        assert_eq!(cli.folder, Some(PathBuf::from("/boards/work")));
        match cli.cmd {
            Command::New {
                title,
                status,
                priority,
                subtasks,
                ..
            } => {
                assert_eq!(title, "Write docs");
                assert_eq!(status, Some(TaskStatus::InProgress));
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(subtasks, vec!["outline", "draft"]);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn parse_ls_with_sort() {
        let cli = Cli::parse_from(["md-kanban", "ls", "--sort", "due-asc", "--config", "board.toml"]);

        assert_eq!(cli.config, Some(PathBuf::from("board.toml")));
        match cli.cmd {
            Command::Ls { sort } => assert_eq!(sort, Some(SortOption::DueAsc)),
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn rejects_unknown_sort_option() {
        assert!(Cli::try_parse_from(["md-kanban", "ls", "--sort", "title-asc"]).is_err());
    }

    #[test]
    fn parse_move_command() {
        let cli = Cli::parse_from(["md-kanban", "move", "--task", "a.md", "--to", "done"]);
        match cli.cmd {
            Command::Move { task, to } => {
                assert_eq!(task, "a.md");
                assert_eq!(to, "done");
            }
            _ => panic!("expected move command"),
        }
    }

    #[test]
    fn parse_close_command() {
        let cli = Cli::parse_from(["md-kanban", "close"]);
        assert!(matches!(cli.cmd, Command::Close));
    }
}
