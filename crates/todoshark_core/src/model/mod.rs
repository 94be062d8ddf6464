//! Domain model for tasks, notes and reminders.
//!
//! # Responsibility
//! - Define canonical records and their creation/patch shapes.
//! - Own local validation rules that run before any store call.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `EntityId`.
//! - Local timestamps are Unix epoch milliseconds.

pub mod note;
pub mod reminder;
pub mod task;

use uuid::Uuid;

/// Store-assigned opaque identifier shared by all entity kinds.
pub type EntityId = Uuid;

/// Local timestamp: Unix epoch milliseconds.
pub type EpochMs = i64;

/// Returns the current wall clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMs {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
