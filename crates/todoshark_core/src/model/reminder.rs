//! Reminder domain model.

use crate::model::task::normalize_optional_text;
use crate::model::{EntityId, EpochMs};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    pub end_date: Option<EpochMs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub date_time: EpochMs,
    pub recurring: Option<Recurrence>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub title: String,
    pub description: Option<String>,
    pub date_time: EpochMs,
    pub recurring: Option<Recurrence>,
    pub completed: bool,
}

impl NewReminder {
    pub fn new(
        title: &str,
        description: Option<&str>,
        date_time: EpochMs,
        recurring: Option<Recurrence>,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            description: normalize_optional_text(description),
            date_time,
            recurring,
            completed: false,
        }
    }

    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        validate_title(&self.title)
    }
}

/// Partial reminder update. `Some(None)` clears a clearable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date_time: Option<EpochMs>,
    pub recurring: Option<Option<Recurrence>>,
    pub completed: Option<bool>,
}

impl ReminderPatch {
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        match self.title.as_deref() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    EmptyTitle,
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
        }
    }
}

impl Error for ReminderValidationError {}

fn validate_title(title: &str) -> Result<(), ReminderValidationError> {
    if title.trim().is_empty() {
        return Err(ReminderValidationError::EmptyTitle);
    }
    Ok(())
}
