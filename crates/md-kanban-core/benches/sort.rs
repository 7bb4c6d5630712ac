#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use md_kanban_core::{Due, Priority, SortOption, Task, TaskId, TaskStatus, Timestamp, sort_tasks};

fn build_tasks(count: usize) -> Vec<Task> {
    (0..count)
        .map(|idx| Task {
            id: TaskId::new(format!("bench/task-{idx}.md")),
            title: format!("task {idx}"),
            created: Timestamp::new(format!("2024-01-{:02}-{:02}:00", idx % 28 + 1, idx % 24)),
            updated: Timestamp::new(format!("2024-02-{:02}-{:02}:00", idx % 27 + 1, idx % 23)),
            status: TaskStatus::ALL[idx % 3],
            priority: Priority::ALL[idx % 3],
            due: if idx % 4 == 0 {
                Due::Unset
            } else {
                Due::On(format!("2024-03-{:02}", idx % 28 + 1))
            },
            assignee: "-".into(),
            sub_tasks: Vec::new(),
            memo: String::new(),
        })
        .collect()
}

fn sort_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_tasks");
    for &option in &[SortOption::CreatedDesc, SortOption::DueAsc, SortOption::PriorityDesc] {
        group.bench_with_input(BenchmarkId::from_parameter(option), &option, |b, &option| {
            b.iter_batched(
                || build_tasks(512),
                |tasks| {
                    black_box(sort_tasks(&tasks, option));
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, sort_benchmark);
criterion_main!(benches);
