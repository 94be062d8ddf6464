//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shown by plan and hunt modes.
//! - Validate local input before any store write.
//!
//! # Invariants
//! - `bucket` and `priority` are always present.
//! - `priority` stays within `1..=5`, `1` being the highest.
//! - `completed_at` is only set by a completing action.
//! - `hidden_until`, when set, is strictly later than the action that set it.

use crate::model::{EntityId, EpochMs};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Planning status of a task. Not a deletion or archival state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskBucket {
    Active,
    Waiting,
    Deferred,
}

impl TaskBucket {
    /// All buckets in board display order.
    pub const ALL: [TaskBucket; 3] = [Self::Active, Self::Waiting, Self::Deferred];

    /// Stable string id used in stored documents and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Waiting => "waiting",
            Self::Deferred => "deferred",
        }
    }

    /// Parses the stable string id. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "waiting" => Some(Self::Waiting),
            "deferred" => Some(Self::Deferred),
            _ => None,
        }
    }
}

/// Task priority in `1..=5`; lower value sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TaskPriority(u8);

impl TaskPriority {
    pub const HIGHEST: TaskPriority = TaskPriority(1);
    pub const LOWEST: TaskPriority = TaskPriority(5);

    /// Creates a priority, rejecting values outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, TaskValidationError> {
        if (Self::HIGHEST.0..=Self::LOWEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TaskValidationError::PriorityOutOfRange(i64::from(value)))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = TaskValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for TaskPriority {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| TaskValidationError::PriorityOutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<TaskPriority> for u8 {
    fn from(value: TaskPriority) -> Self {
        value.0
    }
}

/// Canonical task record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub bucket: TaskBucket,
    pub priority: TaskPriority,
    pub created_at: EpochMs,
    /// Set by the hunt `complete` action.
    pub completed_at: Option<EpochMs>,
    /// Set by the hunt `take out` action; excludes the task from the hunt
    /// queue until this instant.
    pub hidden_until: Option<EpochMs>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns whether a take-out is still in effect at `now`.
    pub fn is_hidden_at(&self, now: EpochMs) -> bool {
        self.hidden_until.is_some_and(|until| until > now)
    }
}

/// Field set for creating a task. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub bucket: TaskBucket,
    pub priority: TaskPriority,
    pub created_at: EpochMs,
    pub completed_at: Option<EpochMs>,
    pub hidden_until: Option<EpochMs>,
}

impl NewTask {
    /// Builds an uncompleted, visible task with trimmed text fields.
    ///
    /// A blank description is treated as absent.
    pub fn new(
        title: &str,
        description: Option<&str>,
        bucket: TaskBucket,
        priority: TaskPriority,
        created_at: EpochMs,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            description: normalize_optional_text(description),
            bucket,
            priority,
            created_at,
            completed_at: None,
            hidden_until: None,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// Partial task update.
///
/// `None` leaves the stored field untouched. For clearable fields,
/// `Some(None)` removes the field from the stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub bucket: Option<TaskBucket>,
    pub priority: Option<TaskPriority>,
    pub completed_at: Option<EpochMs>,
    pub hidden_until: Option<Option<EpochMs>>,
}

impl TaskPatch {
    /// Patch applied by the hunt `complete` action.
    pub fn complete(now: EpochMs) -> Self {
        Self {
            completed_at: Some(now),
            ..Self::default()
        }
    }

    /// Patch applied by the hunt `take out` action.
    pub fn take_out(now: EpochMs, hidden_until: EpochMs) -> Result<Self, TaskValidationError> {
        if hidden_until <= now {
            return Err(TaskValidationError::HiddenUntilNotInFuture {
                hidden_until,
                now,
            });
        }
        Ok(Self {
            hidden_until: Some(Some(hidden_until)),
            ..Self::default()
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        match self.title.as_deref() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// Local validation failures for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    PriorityOutOfRange(i64),
    HiddenUntilNotInFuture { hidden_until: EpochMs, now: EpochMs },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::PriorityOutOfRange(value) => {
                write!(f, "priority must be within 1..=5, got {value}")
            }
            Self::HiddenUntilNotInFuture { hidden_until, now } => write!(
                f,
                "hidden_until ({hidden_until}) must be later than the action time ({now})"
            ),
        }
    }
}

impl Error for TaskValidationError {}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{NewTask, TaskBucket, TaskPatch, TaskPriority, TaskValidationError};

    #[test]
    fn priority_rejects_out_of_range_values() {
        assert!(TaskPriority::new(0).is_err());
        assert!(TaskPriority::new(6).is_err());
        assert_eq!(TaskPriority::new(1).unwrap(), TaskPriority::HIGHEST);
        assert_eq!(
            TaskPriority::try_from(-3_i64).unwrap_err(),
            TaskValidationError::PriorityOutOfRange(-3)
        );
    }

    #[test]
    fn bucket_parse_is_case_insensitive() {
        assert_eq!(TaskBucket::parse(" Waiting "), Some(TaskBucket::Waiting));
        assert_eq!(TaskBucket::parse("archived"), None);
    }

    #[test]
    fn new_task_trims_and_drops_blank_description() {
        let task = NewTask::new("  Ship  ", Some("   "), TaskBucket::Active, TaskPriority::HIGHEST, 1);
        assert_eq!(task.title, "Ship");
        assert_eq!(task.description, None);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn take_out_requires_future_instant() {
        let err = TaskPatch::take_out(1_000, 1_000).unwrap_err();
        assert!(matches!(err, TaskValidationError::HiddenUntilNotInFuture { .. }));
        let patch = TaskPatch::take_out(1_000, 2_000).unwrap();
        assert_eq!(patch.hidden_until, Some(Some(2_000)));
    }
}
