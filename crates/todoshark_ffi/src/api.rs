//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task, hunt, gesture, note and reminder use cases to Dart via FRB.
//! - Translate core errors into user-facing messages.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Validation failures surface their message verbatim ("Title is required");
//!   store failures surface as "Failed to <op>. Please try again.".
//! - All calls share one process-wide document store.

use once_cell::sync::{Lazy, OnceCell};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use todoshark_core::{
    classify_release, core_version as core_version_inner, hunt_queue,
    init_logging as init_logging_inner, now_epoch_ms, ping as ping_inner, CoreConfig,
    DocumentRepository, DocumentStore, EntityId, GestureAction, GestureContext, GestureOutcome,
    HuntAction, HuntCursor, Note, NoteForm, NoteService, Recurrence, RecurrenceFrequency,
    Reminder, ReminderService, ServiceError, SqliteDocumentStore, StoreError, SwipeDirection,
    Task, TaskBoard, TaskBucket, TaskPriority, TaskService,
};

const DB_FILE_NAME: &str = "todoshark.sqlite3";

static STORE: OnceCell<Arc<dyn DocumentStore>> = OnceCell::new();
static CONFIG: Lazy<Mutex<CoreConfig>> = Lazy::new(|| Mutex::new(CoreConfig::default()));
static HUNT_CURSOR: Lazy<Mutex<HuntCursor>> = Lazy::new(|| Mutex::new(HuntCursor::new()));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Replaces interaction tuning from a JSON document; blank input resets to
/// defaults. Returns empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(config_json: String) -> String {
    let parsed = match CoreConfig::from_json_str(&config_json) {
        Ok(config) => config,
        Err(err) => return err.to_string(),
    };
    match CONFIG.lock() {
        Ok(mut config) => {
            *config = parsed;
            String::new()
        }
        Err(_) => "configuration is unavailable".to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created or affected entity id.
    pub id: Option<String>,
    /// User-facing message.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<EntityId>) -> Self {
        Self {
            ok: true,
            id: id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// `active|waiting|deferred`.
    pub bucket: String,
    pub priority: u8,
    pub completed: bool,
    pub hidden_until_ms: Option<i64>,
}

impl From<&Task> for TaskItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            bucket: task.bucket.as_str().to_string(),
            priority: task.priority.get(),
            completed: task.is_completed(),
            hidden_until_ms: task.hidden_until,
        }
    }
}

/// Plan-mode board: the three bucket lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoardResponse {
    pub ok: bool,
    pub active: Vec<TaskItem>,
    pub waiting: Vec<TaskItem>,
    pub deferred: Vec<TaskItem>,
    pub message: String,
}

/// Hunt-mode card: the task under the cursor, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntCardResponse {
    pub ok: bool,
    pub task: Option<TaskItem>,
    /// `"{n} of {total}"`; `None` when the queue is empty.
    pub position_label: Option<String>,
    pub message: String,
}

/// Release classification for one gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureResponse {
    /// `false` when the gesture context was not recognized.
    pub ok: bool,
    /// `complete|take_out|put_back|delete`; `None` when cancelled.
    pub action: Option<String>,
    /// `left|right|down`; `None` means snap back.
    pub exit: Option<String>,
    pub message: String,
}

impl GestureResponse {
    fn cancelled() -> Self {
        Self {
            ok: true,
            action: None,
            exit: None,
            message: String::new(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            ..Self::cancelled()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub updated_at_ms: i64,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.iter().cloned().collect(),
            updated_at_ms: note.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date_time_ms: i64,
    /// `daily|weekly|monthly`.
    pub frequency: Option<String>,
    pub end_date_ms: Option<i64>,
    pub completed: bool,
}

impl From<&Reminder> for ReminderItem {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.to_string(),
            title: reminder.title.clone(),
            description: reminder.description.clone(),
            date_time_ms: reminder.date_time,
            frequency: reminder
                .recurring
                .map(|recurrence| recurrence.frequency.as_str().to_string()),
            end_date_ms: reminder.recurring.and_then(|recurrence| recurrence.end_date),
            completed: reminder.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderListResponse {
    pub ok: bool,
    pub items: Vec<ReminderItem>,
    pub message: String,
}

/// Creates a task in `bucket` (`active|waiting|deferred`) with `priority` 1..=5.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    description: Option<String>,
    bucket: String,
    priority: i64,
) -> ActionResponse {
    let Some(bucket) = TaskBucket::parse(&bucket) else {
        return ActionResponse::failure(format!("unknown bucket `{bucket}`"));
    };
    let priority = match TaskPriority::try_from(priority) {
        Ok(priority) => priority,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let result = with_task_service(|service| {
        service.create_task(&title, description.as_deref(), bucket, priority, now_epoch_ms())
    });
    match result {
        Ok(id) => ActionResponse::success("Task created.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("create task", &err)),
    }
}

/// Replaces a task's title, description, bucket and priority from the
/// plan-mode edit form. A blank description clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    id: String,
    title: String,
    description: Option<String>,
    bucket: String,
    priority: i64,
) -> ActionResponse {
    let Some(id) = parse_id(&id) else {
        return ActionResponse::failure(format!("invalid id `{id}`"));
    };
    let Some(bucket) = TaskBucket::parse(&bucket) else {
        return ActionResponse::failure(format!("unknown bucket `{bucket}`"));
    };
    let priority = match TaskPriority::try_from(priority) {
        Ok(priority) => priority,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let result = with_task_service(|service| {
        service.edit_task(id, &title, description.as_deref(), bucket, priority)
    });
    match result {
        Ok(()) => ActionResponse::success("Task updated.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("update task", &err)),
    }
}

/// Returns the three bucket lists in priority order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_board() -> TaskBoardResponse {
    match with_task_service(|service| service.list_tasks()) {
        Ok(tasks) => {
            let board = TaskBoard::from_snapshot(&tasks);
            let items = |bucket: TaskBucket| -> Vec<TaskItem> {
                board.bucket(bucket).iter().map(TaskItem::from).collect()
            };
            TaskBoardResponse {
                ok: true,
                active: items(TaskBucket::Active),
                waiting: items(TaskBucket::Waiting),
                deferred: items(TaskBucket::Deferred),
                message: format!("{} task(s).", board.len()),
            }
        }
        Err(err) => TaskBoardResponse {
            ok: false,
            active: Vec::new(),
            waiting: Vec::new(),
            deferred: Vec::new(),
            message: user_message("load tasks", &err),
        },
    }
}

/// Returns the task currently under the hunt cursor.
#[flutter_rust_bridge::frb(sync)]
pub fn hunt_current() -> HuntCardResponse {
    let tasks = match with_task_service(|service| service.list_tasks()) {
        Ok(tasks) => tasks,
        Err(err) => return hunt_failure(user_message("load tasks", &err)),
    };
    let Ok(mut cursor) = HUNT_CURSOR.lock() else {
        return hunt_failure("hunt state is unavailable");
    };
    let queue = hunt_queue(&tasks, now_epoch_ms());
    let task = cursor.current(&queue).map(TaskItem::from);
    let position_label = cursor.position_label(&queue);
    let message = if task.is_some() {
        String::new()
    } else {
        "No active tasks.".to_string()
    };
    HuntCardResponse {
        ok: true,
        task,
        position_label,
        message,
    }
}

/// Applies `complete|take_out|put_back` to the current hunt card and advances.
#[flutter_rust_bridge::frb(sync)]
pub fn hunt_apply(action: String) -> ActionResponse {
    let Some(action) = HuntAction::parse(&action) else {
        return ActionResponse::failure(format!("unknown hunt action `{action}`"));
    };
    let hunt_config = match CONFIG.lock() {
        Ok(config) => config.hunt,
        Err(_) => return ActionResponse::failure("configuration is unavailable"),
    };
    let Ok(store) = shared_store() else {
        return ActionResponse::failure(user_message_for_action(action));
    };
    let service = TaskService::with_config(DocumentRepository::<Task>::new(store), hunt_config);
    let tasks = match service.list_tasks() {
        Ok(tasks) => tasks,
        Err(err) => return ActionResponse::failure(user_message("load tasks", &err)),
    };
    let Ok(mut cursor) = HUNT_CURSOR.lock() else {
        return ActionResponse::failure("hunt state is unavailable");
    };
    let now = now_epoch_ms();
    let queue = hunt_queue(&tasks, now);
    match service.apply_hunt_action(&mut cursor, &queue, action, now) {
        Ok(step) => ActionResponse::success(hunt_done_message(action), Some(step.task_id)),
        Err(ServiceError::HuntQueueEmpty) => ActionResponse::failure("No active tasks."),
        Err(_) => ActionResponse::failure(user_message_for_action(action)),
    }
}

/// Classifies a released drag. `context` is `hunt` or `swipe_delete`; any
/// other value is rejected without classifying.
#[flutter_rust_bridge::frb(sync)]
pub fn gesture_classify(context: String, dx: f64, dy: f64) -> GestureResponse {
    let context = match context.trim() {
        "hunt" => GestureContext::HuntCard,
        "swipe_delete" => GestureContext::SwipeToDelete,
        other => {
            log::warn!("event=gesture_classify module=ffi status=rejected context={other}");
            return GestureResponse::rejected(format!("unknown gesture context `{other}`"));
        }
    };
    let gesture = CONFIG
        .lock()
        .map(|config| config.gesture)
        .unwrap_or_default();
    match classify_release(context, &gesture, dx, dy) {
        GestureOutcome::Resolved { action, exit } => GestureResponse {
            ok: true,
            action: Some(
                match action {
                    GestureAction::Hunt(hunt) => hunt.as_str(),
                    GestureAction::DeleteRequested => "delete",
                }
                .to_string(),
            ),
            exit: Some(direction_label(exit).to_string()),
            message: String::new(),
        },
        GestureOutcome::Cancelled => GestureResponse::cancelled(),
    }
}

/// Creates a note; `tags` is a comma-separated list.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String, tags: String) -> ActionResponse {
    let form = NoteForm {
        title,
        content,
        tags,
    };
    match with_note_service(|service| service.create_note(&form, now_epoch_ms())) {
        Ok(id) => ActionResponse::success("Note created.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("create note", &err)),
    }
}

/// Replaces a note's title, content and tags.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String, tags: String) -> ActionResponse {
    let Some(id) = parse_id(&id) else {
        return ActionResponse::failure(format!("invalid id `{id}`"));
    };
    let form = NoteForm {
        title,
        content,
        tags,
    };
    match with_note_service(|service| service.edit_note(id, &form, now_epoch_ms())) {
        Ok(()) => ActionResponse::success("Note updated.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("update note", &err)),
    }
}

/// Notes, most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn note_list() -> NoteListResponse {
    match with_note_service(|service| service.list_notes()) {
        Ok(notes) => NoteListResponse {
            ok: true,
            items: notes.iter().map(NoteItem::from).collect(),
            message: format!("{} note(s).", notes.len()),
        },
        Err(err) => NoteListResponse {
            ok: false,
            items: Vec::new(),
            message: user_message("load notes", &err),
        },
    }
}

/// Creates a reminder. `frequency` is `daily|weekly|monthly` or `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_create(
    title: String,
    description: Option<String>,
    date_time_ms: i64,
    frequency: Option<String>,
    end_date_ms: Option<i64>,
) -> ActionResponse {
    let recurring = match parse_recurrence(frequency.as_deref(), end_date_ms) {
        Ok(recurring) => recurring,
        Err(message) => return ActionResponse::failure(message),
    };
    let result = with_reminder_service(|service| {
        service.create_reminder(&title, description.as_deref(), date_time_ms, recurring)
    });
    match result {
        Ok(id) => ActionResponse::success("Reminder created.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("create reminder", &err)),
    }
}

/// Replaces a reminder from the edit form. A blank description clears it and
/// `frequency = None` turns recurrence off.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_update(
    id: String,
    title: String,
    description: Option<String>,
    date_time_ms: i64,
    frequency: Option<String>,
    end_date_ms: Option<i64>,
) -> ActionResponse {
    let Some(id) = parse_id(&id) else {
        return ActionResponse::failure(format!("invalid id `{id}`"));
    };
    let recurring = match parse_recurrence(frequency.as_deref(), end_date_ms) {
        Ok(recurring) => recurring,
        Err(message) => return ActionResponse::failure(message),
    };
    let result = with_reminder_service(|service| {
        service.edit_reminder(id, &title, description.as_deref(), date_time_ms, recurring)
    });
    match result {
        Ok(()) => ActionResponse::success("Reminder updated.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("update reminder", &err)),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_set_completed(id: String, completed: bool) -> ActionResponse {
    let Some(id) = parse_id(&id) else {
        return ActionResponse::failure(format!("invalid id `{id}`"));
    };
    match with_reminder_service(|service| service.set_completed(id, completed)) {
        Ok(()) => ActionResponse::success("Reminder updated.", Some(id)),
        Err(err) => ActionResponse::failure(user_message("update reminder", &err)),
    }
}

/// Reminders, soonest first.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_list() -> ReminderListResponse {
    match with_reminder_service(|service| service.list_reminders()) {
        Ok(reminders) => ReminderListResponse {
            ok: true,
            items: reminders.iter().map(ReminderItem::from).collect(),
            message: format!("{} reminder(s).", reminders.len()),
        },
        Err(err) => ReminderListResponse {
            ok: false,
            items: Vec::new(),
            message: user_message("load reminders", &err),
        },
    }
}

/// Deletes one entity after the UI confirmed it. `kind` is
/// `task|note|reminder`.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_delete(kind: String, id: String) -> ActionResponse {
    let Some(id) = parse_id(&id) else {
        return ActionResponse::failure(format!("invalid id `{id}`"));
    };
    let result = match kind.trim() {
        "task" => with_task_service(|service| service.delete_task(id)),
        "note" => with_note_service(|service| service.delete_note(id)),
        "reminder" => with_reminder_service(|service| service.delete_reminder(id)),
        other => return ActionResponse::failure(format!("unknown entity kind `{other}`")),
    };
    match result {
        Ok(()) => ActionResponse::success("Deleted.", Some(id)),
        Err(err) => ActionResponse::failure(user_message(&format!("delete {}", kind.trim()), &err)),
    }
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("TODOSHARK_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn shared_store() -> Result<Arc<dyn DocumentStore>, ServiceError> {
    STORE
        .get_or_try_init(|| -> Result<Arc<dyn DocumentStore>, StoreError> {
            let path = resolve_db_path();
            let store = SqliteDocumentStore::open(&path)?;
            log::info!(
                "event=store_open module=ffi status=ok path={}",
                path.display()
            );
            Ok(Arc::new(store))
        })
        .map(Arc::clone)
        .map_err(|err| {
            log::error!("event=store_open module=ffi status=error error={err}");
            ServiceError::Store(err)
        })
}

fn with_task_service<T>(
    f: impl FnOnce(&TaskService<DocumentRepository<Task>>) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let hunt = CONFIG.lock().map(|config| config.hunt).unwrap_or_default();
    let service = TaskService::with_config(DocumentRepository::new(shared_store()?), hunt);
    f(&service)
}

fn with_note_service<T>(
    f: impl FnOnce(&NoteService<DocumentRepository<Note>>) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    f(&NoteService::new(DocumentRepository::new(shared_store()?)))
}

fn with_reminder_service<T>(
    f: impl FnOnce(&ReminderService<DocumentRepository<Reminder>>) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    f(&ReminderService::new(DocumentRepository::new(shared_store()?)))
}

fn user_message(operation: &str, err: &ServiceError) -> String {
    if err.is_validation() {
        err.to_string()
    } else {
        format!("Failed to {operation}. Please try again.")
    }
}

fn user_message_for_action(action: HuntAction) -> String {
    match action {
        HuntAction::Complete => "Failed to complete task. Please try again.",
        HuntAction::TakeOut => "Failed to take out task. Please try again.",
        HuntAction::PutBack => "Failed to put back task. Please try again.",
    }
    .to_string()
}

fn hunt_done_message(action: HuntAction) -> &'static str {
    match action {
        HuntAction::Complete => "Task completed.",
        HuntAction::TakeOut => "Task taken out.",
        HuntAction::PutBack => "Task put back.",
    }
}

fn hunt_failure(message: impl Into<String>) -> HuntCardResponse {
    HuntCardResponse {
        ok: false,
        task: None,
        position_label: None,
        message: message.into(),
    }
}

fn direction_label(direction: SwipeDirection) -> &'static str {
    match direction {
        SwipeDirection::Left => "left",
        SwipeDirection::Right => "right",
        SwipeDirection::Down => "down",
    }
}

fn parse_id(raw: &str) -> Option<EntityId> {
    Uuid::parse_str(raw.trim()).ok()
}

fn parse_recurrence(
    frequency: Option<&str>,
    end_date_ms: Option<i64>,
) -> Result<Option<Recurrence>, String> {
    match frequency.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => RecurrenceFrequency::parse(raw)
            .map(|frequency| {
                Some(Recurrence {
                    frequency,
                    end_date: end_date_ms,
                })
            })
            .ok_or_else(|| format!("unknown frequency `{raw}`")),
    }
}
