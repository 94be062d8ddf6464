//! Core use-case services.
//!
//! # Responsibility
//! - Validate user input locally before any store call.
//! - Orchestrate repository writes for add/edit/delete and hunt actions.
//! - Log every remote-operation outcome at the call site.
//!
//! # Invariants
//! - A validation failure never reaches the store.
//! - Store failures are returned unchanged inside `ServiceError::Store`.

pub mod note_service;
pub mod reminder_service;
pub mod task_service;

use crate::model::note::NoteValidationError;
use crate::model::reminder::ReminderValidationError;
use crate::model::task::TaskValidationError;
use crate::store::{StoreError, StoreResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum ServiceError {
    InvalidTask(TaskValidationError),
    InvalidNote(NoteValidationError),
    InvalidReminder(ReminderValidationError),
    /// Hunt action requested while the hunt queue is empty.
    HuntQueueEmpty,
    Store(StoreError),
}

impl ServiceError {
    /// Validation failures are shown inline; everything else is an alert.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTask(_) | Self::InvalidNote(_) | Self::InvalidReminder(_)
        )
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::InvalidNote(err) => write!(f, "{err}"),
            Self::InvalidReminder(err) => write!(f, "{err}"),
            Self::HuntQueueEmpty => write!(f, "no active tasks to hunt"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidNote(err) => Some(err),
            Self::InvalidReminder(err) => Some(err),
            Self::HuntQueueEmpty => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<NoteValidationError> for ServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

impl From<ReminderValidationError> for ServiceError {
    fn from(value: ReminderValidationError) -> Self {
        Self::InvalidReminder(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Logs one store call outcome with its duration and lifts the error.
fn logged<T>(
    event: &'static str,
    target: &dyn Display,
    started_at: Instant,
    result: StoreResult<T>,
) -> Result<T, ServiceError> {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => {
            info!("event={event} module=service status=ok target={target} duration_ms={duration_ms}");
            Ok(value)
        }
        Err(err) => {
            error!(
                "event={event} module=service status=error target={target} duration_ms={duration_ms} error={err}"
            );
            Err(ServiceError::Store(err))
        }
    }
}
