//! Core domain logic for TodoShark.
//! Task lifecycle, document-store adapter, list projection, gesture
//! classification and the hunt cursor live here; UI shells stay thin.

pub mod config;
pub mod db;
pub mod flow;
pub mod gesture;
pub mod hunt;
pub mod logging;
pub mod model;
pub mod projection;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, GestureConfig, HuntConfig};
pub use flow::{FlowError, ModalFlow, ModalState, SubmitError, SubmitTicket};
pub use gesture::{
    classify_release, GestureAction, GestureContext, GestureOutcome, GestureTracker,
    ReleaseAnimation, SwipeDirection,
};
pub use hunt::{HuntAction, HuntCursor};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteValidationError};
pub use model::reminder::{Recurrence, RecurrenceFrequency, Reminder, ReminderValidationError};
pub use model::task::{Task, TaskBucket, TaskPatch, TaskPriority, TaskValidationError};
pub use model::{now_epoch_ms, EntityId, EpochMs};
pub use projection::{hunt_queue, project_bucket, project_visible, TaskBoard};
pub use service::note_service::{NoteForm, NoteService};
pub use service::reminder_service::ReminderService;
pub use service::task_service::{HuntStep, TaskService};
pub use service::ServiceError;
pub use store::document_store::{DocumentStore, SqliteDocumentStore};
pub use store::repository::{
    subscribe_state, CollectionRepository, DocumentRepository, SnapshotState, Subscription,
};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
