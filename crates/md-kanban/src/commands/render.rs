//! Plain-text output.

use md_kanban_core::{Task, TaskStatus};

/// File name of a task, falling back to its full id.
pub fn file_name(task: &Task) -> String {
    task.id.as_path().file_name().map_or_else(
        || task.id.as_str().to_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// The three columns in the order the tasks are held.
pub fn board(tasks: &[Task]) -> String {
    let mut lines = Vec::new();
    for status in TaskStatus::ALL {
        let column: Vec<&Task> = tasks.iter().filter(|task| task.status == status).collect();
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{} ({})", status.label(), column.len()));
        lines.extend(column.into_iter().map(|task| format!("  {}", card(task))));
    }
    lines.join("\n")
}

fn card(task: &Task) -> String {
    let mut parts = vec![
        if task.title.is_empty() { "(untitled)".to_owned() } else { task.title.clone() },
        format!("[{}]", task.priority),
    ];
    if let Some(date) = task.due.date() {
        parts.push(format!("due {date}"));
    }
    if let Some(assignee) = task.assignee() {
        parts.push(format!("@{assignee}"));
    }
    if !task.sub_tasks.is_empty() {
        parts.push(format!("{}/{}", task.completed_sub_tasks(), task.sub_tasks.len()));
    }
    parts.push(format!("<{}>", file_name(task)));
    parts.join(" ")
}

/// Branch list with `*` on the checked-out branch and `(sync)` on the sync branch.
pub fn branches(branches: &[String], current: Option<&str>, preferred: &str) -> String {
    if branches.is_empty() {
        return "No branches".to_owned();
    }
    branches
        .iter()
        .map(|branch| {
            let marker = if current == Some(branch.as_str()) { '*' } else { ' ' };
            let suffix = if branch == preferred { " (sync)" } else { "" };
            format!("{marker} {branch}{suffix}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
