//! Task use-case service.
//!
//! # Responsibility
//! - Create, edit and delete tasks with local validation.
//! - Apply hunt actions to the task under the cursor and advance it.
//!
//! # Invariants
//! - `complete` writes `completed_at = now`; `take out` writes
//!   `hidden_until = now + take_out_duration`; `put back` writes nothing.
//! - The cursor advances only after the store accepted the write.

use crate::config::HuntConfig;
use crate::hunt::{HuntAction, HuntCursor};
use crate::model::task::{
    normalize_optional_text, NewTask, Task, TaskBucket, TaskPatch, TaskPriority,
};
use crate::model::{EntityId, EpochMs};
use crate::service::{logged, ServiceError};
use crate::store::codec::DocumentEntity;
use crate::store::repository::{CollectionRepository, Subscription};
use crate::store::{StoreError, StoreResult};
use std::time::Instant;

/// Result of one applied hunt action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuntStep {
    pub task_id: EntityId,
    pub action: HuntAction,
    /// Cursor index after advancing.
    pub next_index: usize,
}

pub struct TaskService<R: CollectionRepository<Task>> {
    repo: R,
    config: HuntConfig,
}

impl<R: CollectionRepository<Task>> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, HuntConfig::default())
    }

    pub fn with_config(repo: R, config: HuntConfig) -> Self {
        Self { repo, config }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates an uncompleted, visible task.
    pub fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        bucket: TaskBucket,
        priority: TaskPriority,
        now: EpochMs,
    ) -> Result<EntityId, ServiceError> {
        let draft = NewTask::new(title, description, bucket, priority, now);
        draft.validate()?;
        logged(
            "task_create",
            &"tasks",
            Instant::now(),
            self.repo.create(&draft),
        )
    }

    /// Full edit from the plan-mode edit form. A blank description clears
    /// it; completion and take-out state are left untouched.
    pub fn edit_task(
        &self,
        id: EntityId,
        title: &str,
        description: Option<&str>,
        bucket: TaskBucket,
        priority: TaskPriority,
    ) -> Result<(), ServiceError> {
        let patch = TaskPatch {
            title: Some(title.trim().to_string()),
            description: Some(normalize_optional_text(description)),
            bucket: Some(bucket),
            priority: Some(priority),
            ..TaskPatch::default()
        };
        self.update_task(id, &patch)
    }

    /// Applies a validated partial edit.
    pub fn update_task(&self, id: EntityId, patch: &TaskPatch) -> Result<(), ServiceError> {
        patch.validate()?;
        logged("task_update", &id, Instant::now(), self.repo.update(id, patch))
    }

    pub fn delete_task(&self, id: EntityId) -> Result<(), ServiceError> {
        logged("task_delete", &id, Instant::now(), self.repo.delete(id))
    }

    /// Tasks in store order (priority ascending).
    pub fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        logged("task_list", &"tasks", Instant::now(), self.repo.list_default())
    }

    pub fn subscribe_tasks(
        &self,
        on_change: Box<dyn FnMut(Vec<Task>) + Send>,
        on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription> {
        self.repo.subscribe(Task::default_order(), on_change, on_error)
    }

    /// Applies `action` to the task under `cursor` in `queue`, then advances.
    ///
    /// On store failure the cursor is left where it was.
    pub fn apply_hunt_action(
        &self,
        cursor: &mut HuntCursor,
        queue: &[&Task],
        action: HuntAction,
        now: EpochMs,
    ) -> Result<HuntStep, ServiceError> {
        let task_id = cursor
            .current(queue)
            .map(|task| task.id)
            .ok_or(ServiceError::HuntQueueEmpty)?;

        match action {
            HuntAction::Complete => {
                self.update_task(task_id, &TaskPatch::complete(now))?;
            }
            HuntAction::TakeOut => {
                let hidden_until = now.saturating_add(self.config.take_out_duration_ms);
                let patch = TaskPatch::take_out(now, hidden_until)?;
                self.update_task(task_id, &patch)?;
            }
            HuntAction::PutBack => {}
        }

        cursor.advance(queue);
        log::info!(
            "event=hunt_action module=service status=ok action={} task_id={} next_index={}",
            action.as_str(),
            task_id,
            cursor.index()
        );
        Ok(HuntStep {
            task_id,
            action,
            next_index: cursor.index(),
        })
    }
}
