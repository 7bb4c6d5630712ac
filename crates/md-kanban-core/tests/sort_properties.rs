#![allow(missing_docs)]

use proptest::prelude::*;

use md_kanban_core::{Due, Priority, SortOption, Task, TaskId, TaskStatus, Timestamp, sort_tasks};

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn sort_option_strategy() -> impl Strategy<Value = SortOption> {
    prop::sample::select(SortOption::ALL.to_vec())
}

fn stamp_strategy() -> impl Strategy<Value = Timestamp> {
    // A narrow range so that ties are common.
    (1u8..=3, 0u8..=2).prop_map(|(day, hour)| Timestamp::new(format!("2024-05-{day:02}-{hour:02}:00")))
}

fn due_strategy() -> impl Strategy<Value = Due> {
    prop_oneof![
        Just(Due::Unset),
        (1u8..=4).prop_map(|day| Due::On(format!("2024-06-{day:02}"))),
    ]
}

fn task_list_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (stamp_strategy(), stamp_strategy(), priority_strategy(), due_strategy()),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (created, updated, priority, due))| Task {
                id: TaskId::new(format!("board/task-{idx}.md")),
                title: format!("task {idx}"),
                created,
                updated,
                status: TaskStatus::NotStarted,
                priority,
                due,
                assignee: "-".into(),
                sub_tasks: Vec::new(),
                memo: String::new(),
            })
            .collect()
    })
}

fn input_position(input: &[Task], task: &Task) -> usize {
    input
        .iter()
        .position(|candidate| candidate.id == task.id)
        .unwrap_or_else(|| panic!("sorted output contains foreign task {}", task.id))
}

proptest! {
    #[test]
    fn sort_is_a_stable_permutation(tasks in task_list_strategy(), option in sort_option_strategy()) {
        let sorted = sort_tasks(&tasks, option);

        let mut before: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let mut after: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);

        for pair in sorted.windows(2) {
            let ordering = md_kanban_core::compare_tasks(&pair[0], &pair[1], option);
            prop_assert_ne!(ordering, std::cmp::Ordering::Greater);
            if ordering == std::cmp::Ordering::Equal {
                prop_assert!(input_position(&tasks, &pair[0]) < input_position(&tasks, &pair[1]));
            }
        }
    }

    #[test]
    fn resorting_is_idempotent(tasks in task_list_strategy(), option in sort_option_strategy()) {
        let once = sort_tasks(&tasks, option);
        let twice = sort_tasks(&once, option);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unset_due_always_trails(tasks in task_list_strategy()) {
        for option in [SortOption::DueAsc, SortOption::DueDesc] {
            let sorted = sort_tasks(&tasks, option);
            let first_unset = sorted.iter().position(|t| t.due.is_unset()).unwrap_or(sorted.len());
            prop_assert!(sorted[first_unset..].iter().all(|t| t.due.is_unset()));
        }
    }
}
