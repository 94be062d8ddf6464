//! Note use-case service.
//!
//! # Responsibility
//! - Create and edit notes from raw form input (title, body, tags text).
//! - Refresh `updated_at` on every edit.
//!
//! # Invariants
//! - An empty title is rejected before any store call.
//! - Notes are listed by `updated_at` descending.
//! - A written `updated_at` never precedes the stored `created_at`, even when
//!   the caller's clock is behind the one that created the note.

use crate::model::note::{parse_tags_input, NewNote, Note, NotePatch};
use crate::model::{EntityId, EpochMs};
use crate::service::{logged, ServiceError};
use crate::store::codec::DocumentEntity;
use crate::store::repository::{CollectionRepository, Subscription};
use crate::store::{StoreError, StoreResult};
use std::time::Instant;

/// Raw note form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    /// Comma-separated tags.
    pub tags: String,
}

pub struct NoteService<R: CollectionRepository<Note>> {
    repo: R,
}

impl<R: CollectionRepository<Note>> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn create_note(&self, form: &NoteForm, now: EpochMs) -> Result<EntityId, ServiceError> {
        let draft = NewNote::new(&form.title, &form.content, parse_tags_input(&form.tags), now);
        draft.validate()?;
        logged("note_create", &"notes", Instant::now(), self.repo.create(&draft))
    }

    /// Replaces title, body and tag set, refreshing `updated_at` to `now`.
    ///
    /// `updated_at` is clamped up to the note's `created_at`.
    pub fn edit_note(
        &self,
        id: EntityId,
        form: &NoteForm,
        now: EpochMs,
    ) -> Result<(), ServiceError> {
        let mut patch = NotePatch {
            title: Some(form.title.trim().to_string()),
            content: Some(form.content.trim().to_string()),
            tags: Some(parse_tags_input(&form.tags)),
            updated_at: now,
        };
        patch.validate()?;
        let existing = logged("note_lookup", &id, Instant::now(), self.repo.find(id))?;
        if let Some(note) = existing {
            if now < note.created_at {
                log::warn!(
                    "event=note_update module=service status=clamped id={id} now={now} created_at={}",
                    note.created_at
                );
                patch.updated_at = note.created_at;
            }
        }
        logged("note_update", &id, Instant::now(), self.repo.update(id, &patch))
    }

    pub fn delete_note(&self, id: EntityId) -> Result<(), ServiceError> {
        logged("note_delete", &id, Instant::now(), self.repo.delete(id))
    }

    pub fn list_notes(&self) -> Result<Vec<Note>, ServiceError> {
        logged("note_list", &"notes", Instant::now(), self.repo.list_default())
    }

    pub fn subscribe_notes(
        &self,
        on_change: Box<dyn FnMut(Vec<Note>) + Send>,
        on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription> {
        self.repo.subscribe(Note::default_order(), on_change, on_error)
    }
}
