//! Task file format.
//!
//! A task file is a level-one title followed by three sections:
//!
//! ```markdown
//! # Write release notes
//!
//! ## Metadata
//!
//! - created: 2024-05-01-09:30
//! - updated: 2024-05-02-14:00
//! - status: in-progress
//! - priority: high
//! - due: 2024-05-10
//! - assignee: alice
//!
//! ## Subtasks
//!
//! - [x] collect merged PRs
//! - [ ] draft summary
//!
//! ## Memo
//!
//! Free text.
//! ```
//!
//! Files written by older versions use Japanese headings and status labels;
//! both are accepted when reading.

use thiserror::Error;

use md_kanban_core::{Due, Priority, SubTask, Task, TaskId, TaskStatus, Timestamp, UNSET};

const METADATA_HEADINGS: [&str; 2] = ["Metadata", "メタデータ"];
const SUBTASK_HEADINGS: [&str; 2] = ["Subtasks", "サブタスク"];
const MEMO_HEADINGS: [&str; 2] = ["Memo", "メモ"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Metadata,
    Subtasks,
    Memo,
    Other,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        let heading = heading.trim();
        if METADATA_HEADINGS.contains(&heading) {
            Self::Metadata
        } else if SUBTASK_HEADINGS.contains(&heading) {
            Self::Subtasks
        } else if MEMO_HEADINGS.contains(&heading) {
            Self::Memo
        } else {
            Self::Other
        }
    }
}

#[derive(Default)]
struct Fields<'a> {
    created: Option<&'a str>,
    updated: Option<&'a str>,
    status: Option<&'a str>,
    priority: Option<&'a str>,
    due: Option<&'a str>,
    assignee: Option<&'a str>,
}

impl<'a> Fields<'a> {
    /// Record `- key: value` if the key is known and not yet seen.
    fn absorb(&mut self, line: &'a str) {
        let Some(rest) = line.trim_start().strip_prefix('-') else {
            return;
        };
        let Some((key, value)) = rest.split_once(':') else {
            return;
        };
        let value = strip_annotation(value);
        if value.is_empty() {
            return;
        }
        let slot = match key.trim() {
            "created" => &mut self.created,
            "updated" => &mut self.updated,
            "status" => &mut self.status,
            "priority" => &mut self.priority,
            "due" => &mut self.due,
            "assignee" => &mut self.assignee,
            _ => return,
        };
        slot.get_or_insert(value);
    }
}

/// Drop a trailing full-width parenthesised hint such as `low（low / medium / high）`.
fn strip_annotation(value: &str) -> &str {
    value.split('（').next().unwrap_or_default().trim()
}

fn parse_checkbox(line: &str) -> Option<SubTask> {
    let rest = line.trim_start().strip_prefix('-')?.trim_start();
    let rest = rest.strip_prefix('[')?;
    let mut chars = rest.chars();
    let completed = match chars.next()? {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    let text = chars.as_str().strip_prefix(']')?.trim();
    if text.is_empty() || text == UNSET {
        return None;
    }
    Some(SubTask {
        text: text.to_owned(),
        completed,
    })
}

/// Reason a task file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MarkdownError(pub String);

/// Parse a task file's contents.
///
/// Missing fields take the same defaults `create_task` uses. Unknown status
/// or priority values are rejected so that a later save cannot silently
/// rewrite them.
///
/// # Errors
/// Returns an error when the status or priority value is not recognised.
pub fn parse_task(id: TaskId, content: &str) -> Result<Task, MarkdownError> {
    let mut title = None;
    let mut fields = Fields::default();
    let mut sub_tasks = Vec::new();
    let mut memo_lines = Vec::new();
    let mut section = Section::Preamble;

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            section = Section::from_heading(heading);
            continue;
        }
        if title.is_none()
            && let Some(heading) = line.strip_prefix("# ")
        {
            title = Some(heading.trim());
            continue;
        }
        match section {
            Section::Preamble | Section::Metadata | Section::Other => fields.absorb(line),
            Section::Subtasks => sub_tasks.extend(parse_checkbox(line)),
            Section::Memo => {
                if !line.trim().is_empty() {
                    memo_lines.push(line);
                }
            }
        }
    }

    let status = match fields.status {
        Some(raw) => raw
            .parse::<TaskStatus>()
            .map_err(|err| MarkdownError(err.to_string()))?,
        None => TaskStatus::default(),
    };
    let priority = match fields.priority {
        Some(raw) => raw
            .parse::<Priority>()
            .map_err(|err| MarkdownError(err.to_string()))?,
        None => Priority::default(),
    };
    let memo = memo_lines.join("\n");
    let memo = if memo.trim() == UNSET { String::new() } else { memo };

    Ok(Task {
        id,
        title: title.unwrap_or(UNSET).to_owned(),
        created: fields.created.map_or_else(Timestamp::unset, Timestamp::new),
        updated: fields.updated.map_or_else(Timestamp::unset, Timestamp::new),
        status,
        priority,
        due: fields.due.map_or(Due::Unset, Due::parse),
        assignee: fields.assignee.unwrap_or(UNSET).to_owned(),
        sub_tasks,
        memo,
    })
}

/// Render a task back to its file contents.
#[must_use]
pub fn render_task(task: &Task) -> String {
    let title = if task.title.trim().is_empty() { UNSET } else { task.title.as_str() };
    let assignee = task.assignee().unwrap_or(UNSET);
    let mut out = format!(
        "# {title}\n\n## Metadata\n\n- created: {}\n- updated: {}\n- status: {}\n- priority: {}\n- due: {}\n- assignee: {assignee}\n\n## Subtasks\n\n",
        task.created, task.updated, task.status, task.priority, task.due,
    );
    if task.sub_tasks.is_empty() {
        out.push_str("- [ ] -\n");
    }
    for item in &task.sub_tasks {
        let mark = if item.completed { 'x' } else { ' ' };
        out.push_str(&format!("- [{mark}] {}\n", item.text));
    }
    out.push_str("\n## Memo\n\n");
    if task.memo.trim().is_empty() {
        out.push_str(UNSET);
    } else {
        out.push_str(task.memo.trim_end());
    }
    out.push('\n');
    out
}
