//! Derived task lists for plan and hunt modes.
//!
//! # Invariants
//! - Projections are pure functions of the task snapshot; they are recomputed
//!   on every snapshot, never maintained incrementally.
//! - Input order (store order, priority ascending) is preserved.
//! - The three bucket projections partition the task set.

use crate::model::task::{Task, TaskBucket};
use crate::model::EpochMs;

/// Tasks whose bucket equals `bucket`, in input order.
pub fn project_bucket(tasks: &[Task], bucket: TaskBucket) -> Vec<&Task> {
    tasks.iter().filter(|task| task.bucket == bucket).collect()
}

/// Tasks of `bucket` that are still actionable at `now`: not completed and
/// not taken out.
pub fn project_visible(tasks: &[Task], bucket: TaskBucket, now: EpochMs) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.bucket == bucket && !task.is_completed() && !task.is_hidden_at(now))
        .collect()
}

/// The hunt queue: visible tasks of the active bucket.
pub fn hunt_queue(tasks: &[Task], now: EpochMs) -> Vec<&Task> {
    project_visible(tasks, TaskBucket::Active, now)
}

/// Plan-mode board: one list per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskBoard {
    pub active: Vec<Task>,
    pub waiting: Vec<Task>,
    pub deferred: Vec<Task>,
}

impl TaskBoard {
    /// Partitions a full snapshot into bucket lists.
    pub fn from_snapshot(tasks: &[Task]) -> Self {
        let collect = |bucket: TaskBucket| -> Vec<Task> {
            project_bucket(tasks, bucket).into_iter().cloned().collect()
        };
        Self {
            active: collect(TaskBucket::Active),
            waiting: collect(TaskBucket::Waiting),
            deferred: collect(TaskBucket::Deferred),
        }
    }

    pub fn bucket(&self, bucket: TaskBucket) -> &[Task] {
        match bucket {
            TaskBucket::Active => &self.active,
            TaskBucket::Waiting => &self.waiting,
            TaskBucket::Deferred => &self.deferred,
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.waiting.len() + self.deferred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
