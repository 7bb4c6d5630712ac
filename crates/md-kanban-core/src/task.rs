use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::TaskId;
use crate::status::{Priority, TaskStatus};
use crate::timestamp::Timestamp;

/// Sentinel meaning "field intentionally unset". Sorts last.
pub const UNSET: &str = "-";

/// Checklist entry inside a task. Order is caller-significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    /// Item text.
    pub text: String,
    /// Whether the item is checked off.
    pub completed: bool,
}

impl SubTask {
    /// Unchecked checklist item.
    #[must_use]
    pub fn open(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Due date: an ISO date or the `-` sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Due {
    /// No due date.
    #[default]
    Unset,
    /// ISO `YYYY-MM-DD` date.
    On(String),
}

impl Due {
    /// Interpret a stored value; `-` and blank mean unset.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNSET {
            Self::Unset
        } else {
            Self::On(trimmed.to_owned())
        }
    }

    /// The date, when one is set.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::On(date) => Some(date),
        }
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl From<String> for Due {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Due> for String {
    fn from(value: Due) -> Self {
        match value {
            Due::Unset => UNSET.to_owned(),
            Due::On(date) => date,
        }
    }
}

impl fmt::Display for Due {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.date().unwrap_or(UNSET))
    }
}

/// The unit of work shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Storage key assigned by the backend.
    pub id: TaskId,
    /// Free text, may be empty.
    pub title: String,
    /// Creation time.
    pub created: Timestamp,
    /// Last committed edit. Rewritten by the task store, never by callers.
    pub updated: Timestamp,
    /// Board column membership.
    pub status: TaskStatus,
    /// Weighted priority.
    pub priority: Priority,
    /// Optional due date.
    pub due: Due,
    /// Free text or `-` when unassigned.
    pub assignee: String,
    /// Ordered checklist.
    pub sub_tasks: Vec<SubTask>,
    /// Free-form notes.
    pub memo: String,
}

impl Task {
    /// Copy of this task moved to another column.
    #[must_use]
    pub fn with_status(&self, status: TaskStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Returns true while the task has not been round-tripped through creation.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.id.is_draft()
    }

    /// Assignee, unless it is the unassigned sentinel.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        let value = self.assignee.trim();
        (!value.is_empty() && value != UNSET).then_some(value)
    }

    /// Number of checked-off subtasks.
    #[must_use]
    pub fn completed_sub_tasks(&self) -> usize {
        self.sub_tasks.iter().filter(|item| item.completed).count()
    }
}

/// Task fields supplied when asking the backend to mint a new task.
///
/// Absent optional fields take the backend's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Title; an empty title is stored as `-`.
    pub title: String,
    /// Initial column.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Initial priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Initial due date.
    #[serde(default)]
    pub due: Option<Due>,
    /// Initial assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Initial checklist.
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    /// Initial memo.
    #[serde(default)]
    pub memo: String,
}

impl TaskDraft {
    /// Draft with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Place the new task in a specific column.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the initial priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: TaskId::new("board/write_docs.md"),
            title: "Write docs".into(),
            created: Timestamp::new("2024-01-01-09:00"),
            updated: Timestamp::new("2024-01-02-10:30"),
            status: TaskStatus::NotStarted,
            priority: Priority::Medium,
            due: Due::Unset,
            assignee: UNSET.into(),
            sub_tasks: vec![
                SubTask::open("outline"),
                SubTask {
                    text: "draft".into(),
                    completed: true,
                },
            ],
            memo: String::new(),
        }
    }

    #[test]
    fn due_sentinel_round_trips_through_serde() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Due::Unset)?, "\"-\"");
        let due: Due = serde_json::from_str("\"2024-05-01\"")?;
        assert_eq!(due.date(), Some("2024-05-01"));
        assert!(Due::parse("  ").is_unset());
        Ok(())
    }

    #[test]
    fn with_status_keeps_other_fields() {
        let task = sample();
        let moved = task.with_status(TaskStatus::Done);
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(moved.sub_tasks, task.sub_tasks);
        assert_eq!(moved.updated, task.updated);
    }

    #[test]
    fn assignee_hides_sentinel() {
        let mut task = sample();
        assert_eq!(task.assignee(), None);
        task.assignee = "alice".into();
        assert_eq!(task.assignee(), Some("alice"));
        assert_eq!(task.completed_sub_tasks(), 1);
    }

    #[test]
    fn task_uses_camel_case_wire_names() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(sample())?;
        assert!(value.get("subTasks").is_some());
        assert_eq!(value.get("status").and_then(|v| v.as_str()), Some("not-started"));
        Ok(())
    }
}
