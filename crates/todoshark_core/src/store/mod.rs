//! Remote document store adapter.
//!
//! # Responsibility
//! - Define the document store contract (`DocumentStore`) the app depends on.
//! - Map tasks, notes and reminders to and from store-native documents.
//! - Expose create/update/delete/list/subscribe per entity kind.
//!
//! # Invariants
//! - Subscriptions always deliver full snapshots, never diffs.
//! - Unset fields are omitted from written documents, never written as null.
//! - Store failures surface unchanged to the caller; no local state is
//!   mutated ahead of store confirmation.

pub mod codec;
pub mod document;
pub mod document_store;
pub mod repository;

use crate::db::DbError;
use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store transport and decoding errors.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound {
        collection: String,
        id: EntityId,
    },
    /// Persisted document does not match the expected entity shape.
    InvalidData(String),
    Encode(serde_json::Error),
    /// Store handle is gone (dropped or poisoned).
    Unavailable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
            Self::Encode(err) => write!(f, "document encoding failed: {err}"),
            Self::Unavailable(details) => write!(f, "document store unavailable: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
