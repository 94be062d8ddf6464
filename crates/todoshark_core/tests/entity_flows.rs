use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use todoshark_core::model::note::{NewNote, NotePatch};
use todoshark_core::store::document::OrderBy;
use todoshark_core::{
    classify_release, CollectionRepository, DocumentRepository, GestureAction, GestureConfig,
    GestureContext, ModalFlow, ModalState, Note, NoteForm, NoteService, Recurrence,
    RecurrenceFrequency, Reminder, ReminderService, ServiceError, SqliteDocumentStore, StoreError,
    StoreResult, Subscription,
};
use uuid::Uuid;

const NOW: i64 = 1_700_000_000_000;

/// Records every repository call instead of touching a store.
#[derive(Default)]
struct RecordingNotes {
    updates: RefCell<Vec<(Uuid, NotePatch)>>,
    deletes: RefCell<Vec<Uuid>>,
}

impl CollectionRepository<Note> for RecordingNotes {
    fn create(&self, _draft: &NewNote) -> StoreResult<Uuid> {
        Ok(Uuid::new_v4())
    }

    fn update(&self, id: Uuid, patch: &NotePatch) -> StoreResult<()> {
        self.updates.borrow_mut().push((id, patch.clone()));
        Ok(())
    }

    fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.deletes.borrow_mut().push(id);
        Ok(())
    }

    fn list(&self, _order: &OrderBy) -> StoreResult<Vec<Note>> {
        Ok(Vec::new())
    }

    fn subscribe(
        &self,
        _order: OrderBy,
        _on_change: Box<dyn FnMut(Vec<Note>) + Send>,
        _on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription> {
        Err(StoreError::Unavailable("recording repository"))
    }
}

fn swipe_left_requests_delete() -> bool {
    let outcome = classify_release(
        GestureContext::SwipeToDelete,
        &GestureConfig::default(),
        -150.0,
        0.0,
    );
    outcome.action() == Some(GestureAction::DeleteRequested)
}

#[test]
fn swipe_then_confirm_deletes_exactly_once() {
    let service = NoteService::new(RecordingNotes::default());
    let id = Uuid::new_v4();
    let mut flow = ModalFlow::new();

    assert!(swipe_left_requests_delete());
    flow.request_delete(id).unwrap();
    assert!(flow.is_delete_dialog_open());
    assert!(service.repo().deletes.borrow().is_empty());

    flow.confirm_delete(|id| service.delete_note(*id)).unwrap();

    assert_eq!(*service.repo().deletes.borrow(), vec![id]);
    assert_eq!(flow.state(), &ModalState::Closed);
}

#[test]
fn swipe_then_cancel_never_deletes() {
    let service = NoteService::new(RecordingNotes::default());
    let mut flow = ModalFlow::new();

    assert!(swipe_left_requests_delete());
    flow.request_delete(Uuid::new_v4()).unwrap();
    flow.cancel().unwrap();

    assert!(service.repo().deletes.borrow().is_empty());
    assert_eq!(flow.state(), &ModalState::Closed);
}

#[test]
fn delete_from_detail_cancel_returns_to_detail() {
    let id = Uuid::new_v4();
    let mut flow = ModalFlow::new();
    flow.open_detail(id).unwrap();
    flow.request_delete(id).unwrap();
    flow.cancel().unwrap();
    assert_eq!(flow.state(), &ModalState::Viewing(id));
}

#[test]
fn note_edit_with_empty_title_never_reaches_store() {
    let service = NoteService::new(RecordingNotes::default());
    let id = Uuid::new_v4();
    let mut flow = ModalFlow::new();
    flow.open_detail(id).unwrap();
    flow.start_edit().unwrap();

    let form = NoteForm {
        title: "   ".to_string(),
        content: "body".to_string(),
        tags: String::new(),
    };
    let err = flow
        .run_submit(|_| service.edit_note(id, &form, NOW))
        .unwrap_err();

    assert!(service.repo().updates.borrow().is_empty());
    assert_eq!(err.to_string(), "Title is required");
    assert_eq!(flow.error(), Some("Title is required"));
    assert_eq!(flow.state(), &ModalState::Editing(id));
    assert!(!flow.is_submitting());
}

#[test]
fn note_edit_sends_trimmed_fields_and_fresh_timestamp() {
    let service = NoteService::new(RecordingNotes::default());
    let id = Uuid::new_v4();
    let form = NoteForm {
        title: "  Groceries ".to_string(),
        content: " milk ".to_string(),
        tags: "home, errands, home, ".to_string(),
    };

    service.edit_note(id, &form, NOW + 5).unwrap();

    let updates = service.repo().updates.borrow();
    let (updated_id, patch) = &updates[0];
    assert_eq!(*updated_id, id);
    assert_eq!(patch.title.as_deref(), Some("Groceries"));
    assert_eq!(patch.content.as_deref(), Some("milk"));
    assert_eq!(
        patch.tags,
        Some(BTreeSet::from(["errands".to_string(), "home".to_string()]))
    );
    assert_eq!(patch.updated_at, NOW + 5);
}

#[test]
fn notes_list_most_recently_updated_first() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = NoteService::new(DocumentRepository::<Note>::new(store));
    let form = |title: &str| NoteForm {
        title: title.to_string(),
        ..NoteForm::default()
    };
    let older = service.create_note(&form("older"), NOW).unwrap();
    service.create_note(&form("newer"), NOW + 10).unwrap();
    service.edit_note(older, &form("older, edited"), NOW + 20).unwrap();

    let titles: Vec<String> = service
        .list_notes()
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["older, edited", "newer"]);
}

#[test]
fn note_edit_with_clock_behind_creation_keeps_collection_readable() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = NoteService::new(DocumentRepository::<Note>::new(store));
    let form = |title: &str| NoteForm {
        title: title.to_string(),
        ..NoteForm::default()
    };
    service.create_note(&form("untouched"), 1_000).unwrap();
    let edited = service.create_note(&form("a"), 2_000).unwrap();

    service.edit_note(edited, &form("b"), 1_500).unwrap();

    let notes = service.list_notes().unwrap();
    assert_eq!(notes.len(), 2);
    let note = notes.iter().find(|note| note.id == edited).unwrap();
    assert_eq!(note.title, "b");
    assert_eq!(note.created_at, 2_000);
    assert_eq!(note.updated_at, 2_000);
    assert!(notes.iter().all(|note| note.updated_at >= note.created_at));
}

#[test]
fn reminders_round_trip_recurrence_and_completion() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = ReminderService::new(DocumentRepository::<Reminder>::new(store));
    let weekly = Recurrence {
        frequency: RecurrenceFrequency::Weekly,
        end_date: Some(NOW + 30 * 86_400_000),
    };
    service
        .create_reminder("later", None, NOW + 2_000, None)
        .unwrap();
    let id = service
        .create_reminder("standup", Some("  daily sync "), NOW + 1_000, Some(weekly))
        .unwrap();
    service.set_completed(id, true).unwrap();

    let reminders = service.list_reminders().unwrap();
    assert_eq!(reminders[0].id, id);
    assert_eq!(reminders[0].description.as_deref(), Some("daily sync"));
    assert_eq!(reminders[0].recurring, Some(weekly));
    assert!(reminders[0].completed);

    service
        .edit_reminder(id, "standup", Some("   "), NOW + 3_000, None)
        .unwrap();
    let edited = service
        .list_reminders()
        .unwrap()
        .into_iter()
        .find(|reminder| reminder.id == id)
        .unwrap();
    assert_eq!(edited.description, None);
    assert_eq!(edited.recurring, None);
    assert_eq!(edited.date_time, NOW + 3_000);
}

#[test]
fn reminder_with_blank_title_is_a_validation_error() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = ReminderService::new(DocumentRepository::<Reminder>::new(store));
    let err = service.create_reminder("", None, NOW, None).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReminder(_)));
    assert!(service.list_reminders().unwrap().is_empty());
}
