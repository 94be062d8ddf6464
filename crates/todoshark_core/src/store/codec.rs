//! Entity <-> document converters.
//!
//! # Responsibility
//! - Encode creation drafts and partial patches into store-native documents.
//! - Decode stored documents back into validated entities.
//!
//! # Invariants
//! - Optional fields that are unset are omitted, never written as null.
//! - Timestamps are written as `FieldValue::Timestamp` and read back as
//!   epoch milliseconds.
//! - Decoding rejects documents that violate entity invariants instead of
//!   masking them.

use crate::model::note::{NewNote, Note, NotePatch};
use crate::model::reminder::{NewReminder, Recurrence, RecurrenceFrequency, Reminder, ReminderPatch};
use crate::model::task::{NewTask, Task, TaskBucket, TaskPatch, TaskPriority};
use crate::model::EntityId;
use crate::store::document::{Document, DocumentPatch, FieldValue, OrderBy, StoredDocument};
use crate::store::{StoreError, StoreResult};
use std::collections::BTreeMap;

pub const TASKS_COLLECTION: &str = "tasks";
pub const NOTES_COLLECTION: &str = "notes";
pub const REMINDERS_COLLECTION: &str = "reminders";

const FIELD_TITLE: &str = "title";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_BUCKET: &str = "bucket";
const FIELD_PRIORITY: &str = "priority";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_COMPLETED_AT: &str = "completedAt";
const FIELD_HIDDEN_UNTIL: &str = "hiddenUntil";
const FIELD_CONTENT: &str = "content";
const FIELD_TAGS: &str = "tags";
const FIELD_UPDATED_AT: &str = "updatedAt";
const FIELD_DATE_TIME: &str = "dateTime";
const FIELD_RECURRING: &str = "recurring";
const FIELD_FREQUENCY: &str = "frequency";
const FIELD_END_DATE: &str = "endDate";
const FIELD_COMPLETED: &str = "completed";

/// An entity kind stored as one document collection.
pub trait DocumentEntity: Sized + Clone + Send + 'static {
    /// Field set used to create one entity.
    type Draft;
    /// Partial update shape.
    type Patch;

    const COLLECTION: &'static str;

    /// Order used by list and subscribe when the caller has no preference.
    fn default_order() -> OrderBy;
    fn encode_draft(draft: &Self::Draft) -> Document;
    fn encode_patch(patch: &Self::Patch) -> DocumentPatch;
    fn decode(document: &StoredDocument) -> StoreResult<Self>;
    fn entity_id(&self) -> EntityId;
}

#[derive(Default)]
struct PatchBuilder {
    patch: DocumentPatch,
}

impl PatchBuilder {
    fn set(&mut self, field: &str, value: Option<FieldValue>) -> &mut Self {
        if let Some(value) = value {
            self.patch.set.insert(field.to_string(), value);
        }
        self
    }

    fn set_or_remove(&mut self, field: &str, value: Option<Option<FieldValue>>) -> &mut Self {
        match value {
            None => {}
            Some(Some(value)) => {
                self.patch.set.insert(field.to_string(), value);
            }
            Some(None) => self.patch.remove.push(field.to_string()),
        }
        self
    }

    fn build(&mut self) -> DocumentPatch {
        std::mem::take(&mut self.patch)
    }
}

fn string_value(value: &str) -> FieldValue {
    FieldValue::String(value.to_string())
}

fn tags_value<'a>(tags: impl IntoIterator<Item = &'a String>) -> Option<FieldValue> {
    let values: Vec<FieldValue> = tags.into_iter().map(|tag| string_value(tag)).collect();
    if values.is_empty() {
        None
    } else {
        Some(FieldValue::Array(values))
    }
}

fn recurrence_value(recurrence: &Recurrence) -> FieldValue {
    let mut map = BTreeMap::from([(
        FIELD_FREQUENCY.to_string(),
        string_value(recurrence.frequency.as_str()),
    )]);
    if let Some(end_date) = recurrence.end_date {
        map.insert(FIELD_END_DATE.to_string(), FieldValue::timestamp(end_date));
    }
    FieldValue::Map(map)
}

impl DocumentEntity for Task {
    type Draft = NewTask;
    type Patch = TaskPatch;

    const COLLECTION: &'static str = TASKS_COLLECTION;

    fn default_order() -> OrderBy {
        OrderBy::asc(FIELD_PRIORITY)
    }

    fn encode_draft(draft: &NewTask) -> Document {
        let mut document = Document::new();
        document.insert(FIELD_TITLE.to_string(), string_value(&draft.title));
        document.insert(FIELD_BUCKET.to_string(), string_value(draft.bucket.as_str()));
        document.insert(
            FIELD_PRIORITY.to_string(),
            FieldValue::Integer(i64::from(draft.priority.get())),
        );
        document.insert(
            FIELD_CREATED_AT.to_string(),
            FieldValue::timestamp(draft.created_at),
        );
        if let Some(description) = draft.description.as_deref() {
            document.insert(FIELD_DESCRIPTION.to_string(), string_value(description));
        }
        if let Some(completed_at) = draft.completed_at {
            document.insert(
                FIELD_COMPLETED_AT.to_string(),
                FieldValue::timestamp(completed_at),
            );
        }
        if let Some(hidden_until) = draft.hidden_until {
            document.insert(
                FIELD_HIDDEN_UNTIL.to_string(),
                FieldValue::timestamp(hidden_until),
            );
        }
        document
    }

    fn encode_patch(patch: &TaskPatch) -> DocumentPatch {
        PatchBuilder::default()
            .set(FIELD_TITLE, patch.title.as_deref().map(string_value))
            .set_or_remove(
                FIELD_DESCRIPTION,
                patch
                    .description
                    .as_ref()
                    .map(|value| value.as_deref().map(string_value)),
            )
            .set(FIELD_BUCKET, patch.bucket.map(|bucket| string_value(bucket.as_str())))
            .set(
                FIELD_PRIORITY,
                patch
                    .priority
                    .map(|priority| FieldValue::Integer(i64::from(priority.get()))),
            )
            .set(FIELD_COMPLETED_AT, patch.completed_at.map(FieldValue::timestamp))
            .set_or_remove(
                FIELD_HIDDEN_UNTIL,
                patch.hidden_until.map(|value| value.map(FieldValue::timestamp)),
            )
            .build()
    }

    fn decode(document: &StoredDocument) -> StoreResult<Self> {
        let bucket_text = document.require_string(FIELD_BUCKET)?;
        let bucket = TaskBucket::parse(&bucket_text).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "document {} has invalid bucket `{bucket_text}`",
                document.id
            ))
        })?;
        let priority = TaskPriority::try_from(document.require_integer(FIELD_PRIORITY)?)
            .map_err(|err| StoreError::InvalidData(format!("document {}: {err}", document.id)))?;

        Ok(Task {
            id: document.id,
            title: document.require_string(FIELD_TITLE)?,
            description: document.optional_string(FIELD_DESCRIPTION)?,
            bucket,
            priority,
            created_at: document.require_timestamp(FIELD_CREATED_AT)?,
            completed_at: document.optional_timestamp(FIELD_COMPLETED_AT)?,
            hidden_until: document.optional_timestamp(FIELD_HIDDEN_UNTIL)?,
        })
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl DocumentEntity for Note {
    type Draft = NewNote;
    type Patch = NotePatch;

    const COLLECTION: &'static str = NOTES_COLLECTION;

    fn default_order() -> OrderBy {
        OrderBy::desc(FIELD_UPDATED_AT)
    }

    fn encode_draft(draft: &NewNote) -> Document {
        let mut document = Document::new();
        document.insert(FIELD_TITLE.to_string(), string_value(&draft.title));
        document.insert(FIELD_CONTENT.to_string(), string_value(&draft.content));
        document.insert(
            FIELD_CREATED_AT.to_string(),
            FieldValue::timestamp(draft.created_at),
        );
        document.insert(
            FIELD_UPDATED_AT.to_string(),
            FieldValue::timestamp(draft.updated_at),
        );
        if let Some(tags) = tags_value(&draft.tags) {
            document.insert(FIELD_TAGS.to_string(), tags);
        }
        document
    }

    fn encode_patch(patch: &NotePatch) -> DocumentPatch {
        PatchBuilder::default()
            .set(FIELD_TITLE, patch.title.as_deref().map(string_value))
            .set(FIELD_CONTENT, patch.content.as_deref().map(string_value))
            .set_or_remove(FIELD_TAGS, patch.tags.as_ref().map(tags_value))
            .set(FIELD_UPDATED_AT, Some(FieldValue::timestamp(patch.updated_at)))
            .build()
    }

    fn decode(document: &StoredDocument) -> StoreResult<Self> {
        let note = Note {
            id: document.id,
            title: document.require_string(FIELD_TITLE)?,
            content: document.optional_string(FIELD_CONTENT)?.unwrap_or_default(),
            tags: document
                .optional_string_array(FIELD_TAGS)?
                .into_iter()
                .collect(),
            created_at: document.require_timestamp(FIELD_CREATED_AT)?,
            updated_at: document.require_timestamp(FIELD_UPDATED_AT)?,
        };
        if note.updated_at < note.created_at {
            return Err(StoreError::InvalidData(format!(
                "document {}: updatedAt precedes createdAt",
                document.id
            )));
        }
        Ok(note)
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl DocumentEntity for Reminder {
    type Draft = NewReminder;
    type Patch = ReminderPatch;

    const COLLECTION: &'static str = REMINDERS_COLLECTION;

    fn default_order() -> OrderBy {
        OrderBy::asc(FIELD_DATE_TIME)
    }

    fn encode_draft(draft: &NewReminder) -> Document {
        let mut document = Document::new();
        document.insert(FIELD_TITLE.to_string(), string_value(&draft.title));
        document.insert(
            FIELD_DATE_TIME.to_string(),
            FieldValue::timestamp(draft.date_time),
        );
        document.insert(FIELD_COMPLETED.to_string(), FieldValue::Bool(draft.completed));
        if let Some(description) = draft.description.as_deref() {
            document.insert(FIELD_DESCRIPTION.to_string(), string_value(description));
        }
        if let Some(recurring) = draft.recurring.as_ref() {
            document.insert(FIELD_RECURRING.to_string(), recurrence_value(recurring));
        }
        document
    }

    fn encode_patch(patch: &ReminderPatch) -> DocumentPatch {
        PatchBuilder::default()
            .set(FIELD_TITLE, patch.title.as_deref().map(string_value))
            .set_or_remove(
                FIELD_DESCRIPTION,
                patch
                    .description
                    .as_ref()
                    .map(|value| value.as_deref().map(string_value)),
            )
            .set(FIELD_DATE_TIME, patch.date_time.map(FieldValue::timestamp))
            .set_or_remove(
                FIELD_RECURRING,
                patch
                    .recurring
                    .as_ref()
                    .map(|value| value.as_ref().map(recurrence_value)),
            )
            .set(FIELD_COMPLETED, patch.completed.map(FieldValue::Bool))
            .build()
    }

    fn decode(document: &StoredDocument) -> StoreResult<Self> {
        let recurring = match document.optional_map(FIELD_RECURRING)? {
            None => None,
            Some(map) => Some(decode_recurrence(document.id, map)?),
        };
        Ok(Reminder {
            id: document.id,
            title: document.require_string(FIELD_TITLE)?,
            description: document.optional_string(FIELD_DESCRIPTION)?,
            date_time: document.require_timestamp(FIELD_DATE_TIME)?,
            recurring,
            completed: document.require_bool(FIELD_COMPLETED)?,
        })
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

fn decode_recurrence(id: EntityId, map: &BTreeMap<String, FieldValue>) -> StoreResult<Recurrence> {
    let frequency = match map.get(FIELD_FREQUENCY) {
        Some(FieldValue::String(value)) => RecurrenceFrequency::parse(value),
        _ => None,
    }
    .ok_or_else(|| {
        StoreError::InvalidData(format!("document {id}: recurring.frequency is invalid"))
    })?;
    let end_date = match map.get(FIELD_END_DATE) {
        None => None,
        Some(FieldValue::Timestamp(value)) => Some(value.to_epoch_ms()),
        Some(_) => {
            return Err(StoreError::InvalidData(format!(
                "document {id}: recurring.endDate must be a timestamp"
            )));
        }
    };
    Ok(Recurrence {
        frequency,
        end_date,
    })
}

#[cfg(test)]
mod tests {
    use super::DocumentEntity;
    use crate::model::note::NotePatch;
    use crate::model::task::{NewTask, Task, TaskBucket, TaskPatch, TaskPriority};
    use crate::store::document::{FieldValue, StoredDocument};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    #[test]
    fn task_draft_omits_unset_optional_fields() {
        let draft = NewTask::new("Ship release", None, TaskBucket::Active, TaskPriority::HIGHEST, 10);
        let document = Task::encode_draft(&draft);
        assert!(!document.contains_key("description"));
        assert!(!document.contains_key("completedAt"));
        assert!(!document.contains_key("hiddenUntil"));
        assert_eq!(document.get("bucket"), Some(&FieldValue::String("active".into())));
        assert_eq!(document.get("createdAt"), Some(&FieldValue::timestamp(10)));
    }

    #[test]
    fn empty_task_patch_touches_nothing() {
        let patch = Task::encode_patch(&TaskPatch::default());
        assert!(patch.is_empty());
    }

    #[test]
    fn clearing_hidden_until_removes_the_field() {
        let patch = Task::encode_patch(&TaskPatch {
            hidden_until: Some(None),
            ..TaskPatch::default()
        });
        assert!(patch.set.is_empty());
        assert_eq!(patch.remove, vec!["hiddenUntil".to_string()]);
    }

    #[test]
    fn note_patch_with_empty_tags_removes_tags_field() {
        let patch = crate::model::note::Note::encode_patch(&NotePatch {
            tags: Some(BTreeSet::new()),
            ..NotePatch::touch(5)
        });
        assert_eq!(patch.remove, vec!["tags".to_string()]);
        assert!(patch.set.contains_key("updatedAt"));
    }

    #[test]
    fn decode_rejects_out_of_range_priority() {
        let draft = NewTask::new("x", None, TaskBucket::Waiting, TaskPriority::LOWEST, 1);
        let mut fields = Task::encode_draft(&draft);
        fields.insert("priority".to_string(), FieldValue::Integer(9));
        let document = StoredDocument {
            id: Uuid::new_v4(),
            fields,
        };
        assert!(Task::decode(&document).is_err());
    }
}
