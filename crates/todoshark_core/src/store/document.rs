//! Store-native document format.
//!
//! # Responsibility
//! - Define the field value shapes a document store understands.
//! - Convert local epoch-millisecond timestamps to and from the store's
//!   native timestamp representation.
//!
//! # Invariants
//! - Unset fields are absent from a `Document`; there is no null value.
//! - `StoreTimestamp::nanos` is always `< 1_000_000_000`.

use crate::model::{EntityId, EpochMs};
use crate::store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// Native store timestamp: seconds plus sub-second nanos since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    /// Converts a local timestamp into the native representation.
    ///
    /// Negative (pre-epoch) values floor toward negative infinity so that
    /// `nanos` stays non-negative.
    pub fn from_epoch_ms(epoch_ms: EpochMs) -> Self {
        let seconds = epoch_ms.div_euclid(MILLIS_PER_SECOND);
        let millis = epoch_ms.rem_euclid(MILLIS_PER_SECOND);
        Self {
            seconds,
            nanos: (millis * NANOS_PER_MILLI) as u32,
        }
    }

    /// Converts back to local epoch milliseconds, truncating sub-millisecond precision.
    pub fn to_epoch_ms(self) -> EpochMs {
        self.seconds * MILLIS_PER_SECOND + i64::from(self.nanos) / NANOS_PER_MILLI
    }
}

/// One field value in a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Bool(bool),
    Timestamp(StoreTimestamp),
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    fn type_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) => 1,
            Self::Timestamp(_) => 2,
            Self::String(_) => 3,
            Self::Array(_) => 4,
            Self::Map(_) => 5,
        }
    }

    /// Total order used by collection queries.
    ///
    /// Values of different types order by a fixed type rank; arrays and maps
    /// compare by rank only.
    pub fn order_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    pub fn timestamp(epoch_ms: EpochMs) -> Self {
        Self::Timestamp(StoreTimestamp::from_epoch_ms(epoch_ms))
    }
}

/// Field map of one document. Field names are camelCase.
pub type Document = BTreeMap<String, FieldValue>;

/// Field-level write: `set` merges into the stored document, `remove` deletes
/// fields. Fields named in neither are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub set: Document,
    pub remove: Vec<String>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    /// Applies this patch onto `document` in place.
    pub fn apply_to(&self, document: &mut Document) {
        for field in &self.remove {
            document.remove(field);
        }
        for (field, value) in &self.set {
            document.insert(field.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Collection ordering: one field plus direction. Ties break on document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Sorts documents in place. Documents missing the field sort first
    /// in ascending order.
    pub fn sort(&self, documents: &mut [StoredDocument]) {
        documents.sort_by(|left, right| {
            let by_field = match (left.fields.get(&self.field), right.fields.get(&self.field)) {
                (Some(a), Some(b)) => a.order_cmp(b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let by_field = match self.direction {
                SortDirection::Ascending => by_field,
                SortDirection::Descending => by_field.reverse(),
            };
            by_field.then_with(|| left.id.cmp(&right.id))
        });
    }
}

/// A document together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: EntityId,
    pub fields: Document,
}

impl StoredDocument {
    pub fn require_string(&self, field: &str) -> StoreResult<String> {
        match self.fields.get(field) {
            Some(FieldValue::String(value)) => Ok(value.clone()),
            other => Err(self.type_mismatch(field, "string", other)),
        }
    }

    pub fn optional_string(&self, field: &str) -> StoreResult<Option<String>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FieldValue::String(value)) => Ok(Some(value.clone())),
            other => Err(self.type_mismatch(field, "string", other)),
        }
    }

    pub fn require_integer(&self, field: &str) -> StoreResult<i64> {
        match self.fields.get(field) {
            Some(FieldValue::Integer(value)) => Ok(*value),
            other => Err(self.type_mismatch(field, "integer", other)),
        }
    }

    pub fn require_bool(&self, field: &str) -> StoreResult<bool> {
        match self.fields.get(field) {
            Some(FieldValue::Bool(value)) => Ok(*value),
            other => Err(self.type_mismatch(field, "bool", other)),
        }
    }

    pub fn require_timestamp(&self, field: &str) -> StoreResult<EpochMs> {
        self.optional_timestamp(field)?
            .ok_or_else(|| self.type_mismatch(field, "timestamp", None))
    }

    pub fn optional_timestamp(&self, field: &str) -> StoreResult<Option<EpochMs>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FieldValue::Timestamp(value)) => Ok(Some(value.to_epoch_ms())),
            other => Err(self.type_mismatch(field, "timestamp", other)),
        }
    }

    pub fn optional_string_array(&self, field: &str) -> StoreResult<Vec<String>> {
        match self.fields.get(field) {
            None => Ok(Vec::new()),
            Some(FieldValue::Array(values)) => values
                .iter()
                .map(|value| match value {
                    FieldValue::String(text) => Ok(text.clone()),
                    other => Err(self.type_mismatch(field, "string array", Some(other))),
                })
                .collect(),
            other => Err(self.type_mismatch(field, "string array", other)),
        }
    }

    pub fn optional_map(&self, field: &str) -> StoreResult<Option<&BTreeMap<String, FieldValue>>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FieldValue::Map(map)) => Ok(Some(map)),
            other => Err(self.type_mismatch(field, "map", other)),
        }
    }

    fn type_mismatch(&self, field: &str, expected: &str, found: Option<&FieldValue>) -> StoreError {
        let found = match found {
            None => "missing",
            Some(FieldValue::String(_)) => "string",
            Some(FieldValue::Integer(_)) => "integer",
            Some(FieldValue::Bool(_)) => "bool",
            Some(FieldValue::Timestamp(_)) => "timestamp",
            Some(FieldValue::Array(_)) => "array",
            Some(FieldValue::Map(_)) => "map",
        };
        StoreError::InvalidData(format!(
            "document {} field `{field}`: expected {expected}, found {found}",
            self.id
        ))
    }
}
