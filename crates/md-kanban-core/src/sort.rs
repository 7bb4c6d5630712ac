use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::task::Task;

/// Field a board is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Creation timestamp.
    Created,
    /// Last edit timestamp.
    Updated,
    /// Due date, unset last.
    Due,
    /// Priority weight.
    Priority,
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// One of the eight supported board orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
    /// Most recently edited first.
    UpdatedDesc,
    /// Least recently edited first.
    UpdatedAsc,
    /// Earliest due date first, unset last.
    DueAsc,
    /// Latest due date first, unset last.
    DueDesc,
    /// High, medium, low.
    PriorityDesc,
    /// Low, medium, high.
    PriorityAsc,
}

impl SortOption {
    /// Every option, in menu order.
    pub const ALL: [Self; 8] = [
        Self::CreatedDesc,
        Self::CreatedAsc,
        Self::UpdatedDesc,
        Self::UpdatedAsc,
        Self::DueAsc,
        Self::DueDesc,
        Self::PriorityDesc,
        Self::PriorityAsc,
    ];

    /// Compose an option from its key and direction.
    #[must_use]
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        match (key, direction) {
            (SortKey::Created, SortDirection::Desc) => Self::CreatedDesc,
            (SortKey::Created, SortDirection::Asc) => Self::CreatedAsc,
            (SortKey::Updated, SortDirection::Desc) => Self::UpdatedDesc,
            (SortKey::Updated, SortDirection::Asc) => Self::UpdatedAsc,
            (SortKey::Due, SortDirection::Asc) => Self::DueAsc,
            (SortKey::Due, SortDirection::Desc) => Self::DueDesc,
            (SortKey::Priority, SortDirection::Desc) => Self::PriorityDesc,
            (SortKey::Priority, SortDirection::Asc) => Self::PriorityAsc,
        }
    }

    /// Field this option orders by.
    #[must_use]
    pub const fn key(self) -> SortKey {
        match self {
            Self::CreatedDesc | Self::CreatedAsc => SortKey::Created,
            Self::UpdatedDesc | Self::UpdatedAsc => SortKey::Updated,
            Self::DueAsc | Self::DueDesc => SortKey::Due,
            Self::PriorityDesc | Self::PriorityAsc => SortKey::Priority,
        }
    }

    /// Direction of this option.
    #[must_use]
    pub const fn direction(self) -> SortDirection {
        match self {
            Self::CreatedAsc | Self::UpdatedAsc | Self::DueAsc | Self::PriorityAsc => SortDirection::Asc,
            Self::CreatedDesc | Self::UpdatedDesc | Self::DueDesc | Self::PriorityDesc => SortDirection::Desc,
        }
    }

    /// Wire value such as `created-desc`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedDesc => "created-desc",
            Self::CreatedAsc => "created-asc",
            Self::UpdatedDesc => "updated-desc",
            Self::UpdatedAsc => "updated-asc",
            Self::DueAsc => "due-asc",
            Self::DueDesc => "due-desc",
            Self::PriorityDesc => "priority-desc",
            Self::PriorityAsc => "priority-asc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == wanted)
            .ok_or_else(|| ParseError::SortOption(wanted.to_owned()))
    }
}

/// Compare two tasks under `option`.
///
/// Timestamps and due dates compare lexically, which is chronological for
/// their fixed formats. Tasks without a due date come after every dated task
/// in both directions.
#[must_use]
pub fn compare_tasks(a: &Task, b: &Task, option: SortOption) -> Ordering {
    match option {
        SortOption::CreatedDesc => b.created.cmp(&a.created),
        SortOption::CreatedAsc => a.created.cmp(&b.created),
        SortOption::UpdatedDesc => b.updated.cmp(&a.updated),
        SortOption::UpdatedAsc => a.updated.cmp(&b.updated),
        SortOption::DueAsc => compare_due(a, b, SortDirection::Asc),
        SortOption::DueDesc => compare_due(a, b, SortDirection::Desc),
        SortOption::PriorityDesc => b.priority.weight().cmp(&a.priority.weight()),
        SortOption::PriorityAsc => a.priority.weight().cmp(&b.priority.weight()),
    }
}

fn compare_due(a: &Task, b: &Task, direction: SortDirection) -> Ordering {
    match (a.due.date(), b.due.date()) {
        (Some(left), Some(right)) => match direction {
            SortDirection::Asc => left.cmp(right),
            SortDirection::Desc => right.cmp(left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort in place; equal tasks keep their relative order.
pub fn sort_in_place(tasks: &mut [Task], option: SortOption) {
    tasks.sort_by(|a, b| compare_tasks(a, b, option));
}

/// Return a sorted copy, leaving `tasks` untouched.
#[must_use]
pub fn sort_tasks(tasks: &[Task], option: SortOption) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sort_in_place(&mut sorted, option);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::status::{Priority, TaskStatus};
    use crate::task::{Due, UNSET};
    use crate::timestamp::Timestamp;

    fn task(name: &str, priority: Priority, due: &str) -> Task {
        Task {
            id: TaskId::new(format!("board/{name}.md")),
            title: name.into(),
            created: Timestamp::new("2024-01-01-00:00"),
            updated: Timestamp::new("2024-01-01-00:00"),
            status: TaskStatus::NotStarted,
            priority,
            due: Due::parse(due),
            assignee: UNSET.into(),
            sub_tasks: Vec::new(),
            memo: String::new(),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn priority_orders_by_weight() {
        let input = vec![
            task("low", Priority::Low, UNSET),
            task("high", Priority::High, UNSET),
            task("medium", Priority::Medium, UNSET),
        ];
        assert_eq!(
            titles(&sort_tasks(&input, SortOption::PriorityDesc)),
            vec!["high", "medium", "low"]
        );
        assert_eq!(
            titles(&sort_tasks(&input, SortOption::PriorityAsc)),
            vec!["low", "medium", "high"]
        );
    }

    #[test]
    fn unset_due_sorts_last_in_both_directions() {
        let input = vec![
            task("none-a", Priority::Low, UNSET),
            task("march", Priority::Low, "2024-03-01"),
            task("none-b", Priority::Low, UNSET),
            task("january", Priority::Low, "2024-01-15"),
        ];
        assert_eq!(
            titles(&sort_tasks(&input, SortOption::DueAsc)),
            vec!["january", "march", "none-a", "none-b"]
        );
        assert_eq!(
            titles(&sort_tasks(&input, SortOption::DueDesc)),
            vec!["march", "january", "none-a", "none-b"]
        );
    }

    #[test]
    fn created_and_updated_compare_lexically() {
        let mut older = task("older", Priority::Low, UNSET);
        older.created = Timestamp::new("2023-12-31-23:59");
        older.updated = Timestamp::new("2024-02-01-08:00");
        let mut newer = task("newer", Priority::Low, UNSET);
        newer.created = Timestamp::new("2024-01-01-00:00");
        newer.updated = Timestamp::new("2024-01-05-08:00");
        let input = vec![older, newer];

        assert_eq!(titles(&sort_tasks(&input, SortOption::CreatedDesc)), vec!["newer", "older"]);
        assert_eq!(titles(&sort_tasks(&input, SortOption::CreatedAsc)), vec!["older", "newer"]);
        assert_eq!(titles(&sort_tasks(&input, SortOption::UpdatedDesc)), vec!["older", "newer"]);
        assert_eq!(titles(&sort_tasks(&input, SortOption::UpdatedAsc)), vec!["newer", "older"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let input = vec![
            task("first", Priority::Medium, UNSET),
            task("second", Priority::Medium, UNSET),
            task("third", Priority::Medium, UNSET),
        ];
        for option in SortOption::ALL {
            assert_eq!(titles(&sort_tasks(&input, option)), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(sort_tasks(&[], SortOption::DueDesc).is_empty());
    }

    #[test]
    fn option_parses_its_wire_value() {
        for option in SortOption::ALL {
            assert_eq!(option.as_str().parse::<SortOption>(), Ok(option));
            assert_eq!(SortOption::new(option.key(), option.direction()), option);
        }
        assert!("title-asc".parse::<SortOption>().is_err());
    }
}
