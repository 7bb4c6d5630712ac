//! Repository detection, branch listing, and the pull/commit/push sync.

use git2::{BranchType, ErrorCode, Repository};
use md_kanban_core::SyncResult;
use md_kanban_core::timestamp::local_now;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use time::macros::format_description;
use tracing::{debug, info};

use crate::error::StoreError;

const REMOTE: &str = "origin";

/// Git working copy that contains a task folder.
///
/// Detection and branch queries go through libgit2. Sync shells out to the
/// `git` binary so that the user's credential helpers, hooks, and merge
/// configuration apply.
pub struct GitRepo {
    folder: PathBuf,
    repo: Repository,
}

impl GitRepo {
    /// Returns true if `folder` or any ancestor is inside a git repository.
    ///
    /// # Errors
    /// Returns an error if discovery fails for a reason other than "not found".
    pub fn is_repository(folder: &Path) -> Result<bool, StoreError> {
        match Repository::discover(folder) {
            Ok(_) => Ok(true),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Discover the repository containing `folder`.
    ///
    /// # Errors
    /// Returns an error if no repository encloses `folder`.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let folder = folder.into();
        let repo = Repository::discover(&folder)?;
        Ok(Self { folder, repo })
    }

    /// Local and `origin` branch names, de-duplicated and sorted.
    ///
    /// # Errors
    /// Returns an error if the branch list cannot be read.
    pub fn branches(&self) -> Result<Vec<String>, StoreError> {
        let mut names = BTreeSet::new();
        for entry in self.repo.branches(None)? {
            let (branch, kind) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            let name = match kind {
                BranchType::Local => name,
                BranchType::Remote => match name.strip_prefix("origin/") {
                    Some(stripped) => stripped,
                    None => continue,
                },
            };
            if name != "HEAD" {
                names.insert(name.to_owned());
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Short name of the branch HEAD points at, even before the first commit.
    ///
    /// A detached HEAD is reported as `HEAD`.
    ///
    /// # Errors
    /// Returns an error if HEAD cannot be read.
    pub fn current_branch(&self) -> Result<String, StoreError> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head.symbolic_target().map_or_else(
            || "HEAD".to_owned(),
            |target| target.strip_prefix("refs/heads/").unwrap_or(target).to_owned(),
        ))
    }

    /// Pull `branch` from origin, then commit and push local task changes.
    ///
    /// A pull that stops on a merge conflict is reported through
    /// [`SyncResult::conflicts`] rather than as an error. A branch that does
    /// not exist on the remote yet is not an error either; the push creates it.
    ///
    /// # Errors
    /// Returns an error if checkout, pull, staging, commit, or push fails.
    pub fn sync(&self, branch: &str) -> Result<SyncResult, StoreError> {
        let checked_out = self.repo.head().ok().and_then(|head| head.shorthand().map(str::to_owned));
        if let Some(current) = checked_out
            && current != branch
        {
            info!(from = %current, to = %branch, "Switching branch for sync");
            self.git_checked(&["checkout", branch])?;
        }

        // Best effort; a missing remote branch is handled by the pull below.
        let _ = self.git(&["fetch", REMOTE, branch])?;

        let mut pulled = false;
        let pull = self.git(&["pull", REMOTE, branch])?;
        let pull_stdout = String::from_utf8_lossy(&pull.stdout);
        let pull_stderr = String::from_utf8_lossy(&pull.stderr);
        if pull.status.success() {
            pulled = !pull_stdout.contains("Already up to date") && !pull_stdout.contains("Already up-to-date");
        } else if [&pull_stdout, &pull_stderr]
            .iter()
            .any(|text| text.contains("CONFLICT") || text.contains("conflict"))
        {
            info!(branch = %branch, "Sync stopped on a merge conflict");
            return Ok(SyncResult {
                conflicts: true,
                message: "Merge conflict. Resolve it manually, then sync again.".to_owned(),
                ..SyncResult::default()
            });
        } else if !pull_stderr.contains("couldn't find remote ref") {
            return Err(command_error(&["pull", REMOTE, branch], &pull));
        }

        self.git_checked(&["add", "--all", "--", "."])?;
        let staged = self.git(&["diff", "--cached", "--quiet", "--", "."])?;
        let mut pushed = false;
        if !staged.status.success() {
            let message = commit_message();
            let commit = self.git(&["commit", "-m", &message, "--", "."])?;
            if !commit.status.success() && !String::from_utf8_lossy(&commit.stdout).contains("nothing to commit") {
                return Err(command_error(&["commit"], &commit));
            }
            self.git_checked(&["push", REMOTE, branch])?;
            pushed = true;
        }

        let message = match (pulled, pushed) {
            (true, true) => "Pulled remote changes and pushed local changes.",
            (true, false) => "Pulled remote changes.",
            (false, true) => "Pushed local changes.",
            (false, false) => "No changes.",
        };
        info!(branch = %branch, pulled, pushed, "Sync finished");
        Ok(SyncResult {
            pulled,
            pushed,
            conflicts: false,
            message: message.to_owned(),
        })
    }

    fn git(&self, args: &[&str]) -> Result<Output, StoreError> {
        debug!(?args, folder = %self.folder.display(), "Running git");
        git_command(&self.folder, args)
            .output()
            .map_err(|err| StoreError::GitCommand {
                command: args.join(" "),
                stderr: err.to_string(),
            })
    }

    fn git_checked(&self, args: &[&str]) -> Result<Output, StoreError> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(command_error(args, &output))
        }
    }
}

/// `git` in `folder` with prompts off and untranslated messages.
fn git_command(folder: &Path, args: &[&str]) -> Command {
    let mut command = Command::new("git");
    command
        .args(args)
        .current_dir(folder)
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C");
    command
}

fn command_error(args: &[&str], output: &Output) -> StoreError {
    StoreError::GitCommand {
        command: args.join(" "),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    }
}

fn commit_message() -> String {
    let stamp = local_now()
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default();
    format!("Task sync: {stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn commit_message_carries_minute_stamp() {
        let message = commit_message();
        let stamp = message.trim_start_matches("Task sync: ");
        assert_eq!(stamp.len(), "YYYY-MM-DD HH:MM".len());
    }

    #[test]
    fn git_runs_with_c_locale_and_no_prompts() {
        let command = git_command(Path::new("/boards/work"), &["pull", "origin", "main"]);
        let envs: Vec<_> = command.get_envs().collect();

        assert!(envs.contains(&(OsStr::new("LC_ALL"), Some(OsStr::new("C")))));
        assert!(envs.contains(&(OsStr::new("GIT_TERMINAL_PROMPT"), Some(OsStr::new("0")))));
        assert_eq!(command.get_current_dir(), Some(Path::new("/boards/work")));
        assert_eq!(command.get_args().collect::<Vec<_>>(), ["pull", "origin", "main"]);
    }
}
