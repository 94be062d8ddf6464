//! Reminder use-case service.

use crate::model::reminder::{NewReminder, Recurrence, Reminder, ReminderPatch};
use crate::model::task::normalize_optional_text;
use crate::model::{EntityId, EpochMs};
use crate::service::{logged, ServiceError};
use crate::store::codec::DocumentEntity;
use crate::store::repository::{CollectionRepository, Subscription};
use crate::store::{StoreError, StoreResult};
use std::time::Instant;

pub struct ReminderService<R: CollectionRepository<Reminder>> {
    repo: R,
}

impl<R: CollectionRepository<Reminder>> ReminderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_reminder(
        &self,
        title: &str,
        description: Option<&str>,
        date_time: EpochMs,
        recurring: Option<Recurrence>,
    ) -> Result<EntityId, ServiceError> {
        let draft = NewReminder::new(title, description, date_time, recurring);
        draft.validate()?;
        logged(
            "reminder_create",
            &"reminders",
            Instant::now(),
            self.repo.create(&draft),
        )
    }

    /// Full edit from the edit form. A blank description clears it; turning
    /// recurrence off removes it.
    pub fn edit_reminder(
        &self,
        id: EntityId,
        title: &str,
        description: Option<&str>,
        date_time: EpochMs,
        recurring: Option<Recurrence>,
    ) -> Result<(), ServiceError> {
        let patch = ReminderPatch {
            title: Some(title.trim().to_string()),
            description: Some(normalize_optional_text(description)),
            date_time: Some(date_time),
            recurring: Some(recurring),
            completed: None,
        };
        patch.validate()?;
        logged("reminder_update", &id, Instant::now(), self.repo.update(id, &patch))
    }

    pub fn set_completed(&self, id: EntityId, completed: bool) -> Result<(), ServiceError> {
        let patch = ReminderPatch {
            completed: Some(completed),
            ..ReminderPatch::default()
        };
        logged("reminder_update", &id, Instant::now(), self.repo.update(id, &patch))
    }

    pub fn delete_reminder(&self, id: EntityId) -> Result<(), ServiceError> {
        logged("reminder_delete", &id, Instant::now(), self.repo.delete(id))
    }

    /// Reminders by `date_time` ascending.
    pub fn list_reminders(&self) -> Result<Vec<Reminder>, ServiceError> {
        logged(
            "reminder_list",
            &"reminders",
            Instant::now(),
            self.repo.list_default(),
        )
    }

    pub fn subscribe_reminders(
        &self,
        on_change: Box<dyn FnMut(Vec<Reminder>) + Send>,
        on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription> {
        self.repo
            .subscribe(Reminder::default_order(), on_change, on_error)
    }
}
