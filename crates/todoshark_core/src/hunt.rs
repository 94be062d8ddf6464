//! Hunt mode cursor over the visible active-bucket queue.
//!
//! # Responsibility
//! - Track which task the hunt view is showing.
//! - Advance after every classified action with wrap-around.
//! - Re-anchor when a new snapshot changes the queue.
//!
//! # Invariants
//! - `index` is `0` when the queue is empty, otherwise within `[0, len-1]`
//!   after `sync`.
//! - The cursor follows the viewed task by id; it falls back to the clamped
//!   index only when that task left the queue.

use crate::model::task::Task;
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

/// Disposition applied to the current hunt task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntAction {
    /// Mark the task done (`completed_at = now`).
    Complete,
    /// Hide the task from the hunt queue until a future time.
    TakeOut,
    /// Skip without touching the task.
    PutBack,
}

impl HuntAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::TakeOut => "take_out",
            Self::PutBack => "put_back",
        }
    }

    /// Accepts snake_case and camelCase spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "complete" => Some(Self::Complete),
            "take_out" | "takeOut" => Some(Self::TakeOut),
            "put_back" | "putBack" => Some(Self::PutBack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuntCursor {
    index: usize,
    current: Option<EntityId>,
}

impl HuntCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the task the view last showed, if any.
    pub fn current_id(&self) -> Option<EntityId> {
        self.current
    }

    /// Re-anchors the cursor against a freshly projected queue.
    pub fn sync(&mut self, queue: &[&Task]) {
        if queue.is_empty() {
            self.index = 0;
            self.current = None;
            return;
        }

        if let Some(position) = self
            .current
            .and_then(|id| queue.iter().position(|task| task.id == id))
        {
            self.index = position;
            return;
        }

        self.index = self.index.min(queue.len() - 1);
        self.current = Some(queue[self.index].id);
    }

    /// The task under the cursor after re-anchoring against `queue`.
    pub fn current<'a>(&mut self, queue: &[&'a Task]) -> Option<&'a Task> {
        self.sync(queue);
        queue.get(self.index).copied()
    }

    /// Moves to the next task, wrapping to the first after the last.
    pub fn advance(&mut self, queue: &[&Task]) {
        self.sync(queue);
        if queue.is_empty() {
            return;
        }
        self.index = if self.index + 1 < queue.len() {
            self.index + 1
        } else {
            0
        };
        self.current = Some(queue[self.index].id);
    }

    /// One-based position label such as `"2 of 5"`; `None` for an empty queue.
    pub fn position_label(&mut self, queue: &[&Task]) -> Option<String> {
        self.sync(queue);
        if queue.is_empty() {
            None
        } else {
            Some(format!("{} of {}", self.index + 1, queue.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HuntAction;

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!(HuntAction::parse("takeOut"), Some(HuntAction::TakeOut));
        assert_eq!(HuntAction::parse("put_back"), Some(HuntAction::PutBack));
        assert_eq!(HuntAction::parse("skip"), None);
    }
}
