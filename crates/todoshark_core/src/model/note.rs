//! Note domain model.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `updated_at >= created_at`; every edit refreshes `updated_at`.
//! - `tags` is a set: order-irrelevant, no duplicates, may be empty.

use crate::model::{EntityId, EpochMs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    /// May be empty.
    pub content: String,
    pub tags: BTreeSet<String>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

impl NewNote {
    /// Builds a note whose `updated_at` equals `created_at`.
    pub fn new(title: &str, content: &str, tags: BTreeSet<String>, now: EpochMs) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Partial note update. `updated_at` is mandatory: every edit refreshes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub updated_at: EpochMs,
}

impl NotePatch {
    pub fn touch(now: EpochMs) -> Self {
        Self {
            title: None,
            content: None,
            tags: None,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        match self.title.as_deref() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    UpdatedBeforeCreated {
        created_at: EpochMs,
        updated_at: EpochMs,
    },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Parses a comma-separated tag input into a tag set.
///
/// Pieces are trimmed; empty pieces are dropped; duplicates collapse.
pub fn parse_tags_input(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders a tag set back into the comma-separated edit form.
pub fn format_tags_input(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{format_tags_input, parse_tags_input, NewNote, NoteValidationError};

    #[test]
    fn parse_tags_drops_empty_pieces_and_duplicates() {
        let tags = parse_tags_input(" work, ,ideas,work ,");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("work"));
        assert!(tags.contains("ideas"));
        assert_eq!(format_tags_input(&tags), "ideas, work");
    }

    #[test]
    fn validate_rejects_blank_title() {
        let note = NewNote::new("   ", "body", Default::default(), 10);
        assert_eq!(note.validate().unwrap_err(), NoteValidationError::EmptyTitle);
    }
}
