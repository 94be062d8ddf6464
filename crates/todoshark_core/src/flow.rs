//! Entity CRUD modal flow shared by the notes, reminders and tasks tabs.
//!
//! # Responsibility
//! - Replace per-screen modal booleans with one explicit state machine:
//!   `Closed | Adding | Viewing | Editing | ConfirmingDelete`.
//! - Guard against duplicate submissions while a write is outstanding.
//! - Drop results of writes whose modal was closed before they finished.
//!
//! # Invariants
//! - At most one submission is in flight per flow.
//! - Deletion is only reachable through `ConfirmingDelete`.
//! - A failed submission leaves the state unchanged (so the user can retry)
//!   and records the error message.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState<Id> {
    Closed,
    Adding,
    Viewing(Id),
    Editing(Id),
    ConfirmingDelete { id: Id, from_detail: bool },
}

impl<Id> ModalState<Id> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Adding => "adding",
            Self::Viewing(_) => "viewing",
            Self::Editing(_) => "editing",
            Self::ConfirmingDelete { .. } => "confirming_delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    AlreadySubmitting,
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} while modal is {from}")
            }
            Self::AlreadySubmitting => write!(f, "a submission is already in flight"),
        }
    }
}

impl Error for FlowError {}

/// Failure of [`ModalFlow::run_submit`]: either the flow refused, or the
/// operation itself failed.
#[derive(Debug)]
pub enum SubmitError<E> {
    Flow(FlowError),
    Operation(E),
}

impl<E: Display> Display for SubmitError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flow(err) => write!(f, "{err}"),
            Self::Operation(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for SubmitError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Flow(err) => Some(err),
            Self::Operation(err) => Some(err),
        }
    }
}

impl<E> From<FlowError> for SubmitError<E> {
    fn from(value: FlowError) -> Self {
        Self::Flow(value)
    }
}

/// Proof of an in-flight submission. Stale tickets are ignored on finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct ModalFlow<Id> {
    state: ModalState<Id>,
    submitting: bool,
    error: Option<String>,
    generation: u64,
}

impl<Id: Clone + PartialEq + Debug> Default for ModalFlow<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Clone + PartialEq + Debug> ModalFlow<Id> {
    pub fn new() -> Self {
        Self {
            state: ModalState::Closed,
            submitting: false,
            error: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ModalState<Id> {
        &self.state
    }

    /// True while a write is outstanding; the submit control should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Inline error message from the last validation or write failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_delete_dialog_open(&self) -> bool {
        matches!(self.state, ModalState::ConfirmingDelete { .. })
    }

    pub fn open_add(&mut self) -> Result<(), FlowError> {
        self.transition("open_add", |state| match state {
            ModalState::Closed => Some(ModalState::Adding),
            _ => None,
        })
    }

    pub fn open_detail(&mut self, id: Id) -> Result<(), FlowError> {
        self.transition("open_detail", move |state| match state {
            ModalState::Closed => Some(ModalState::Viewing(id)),
            _ => None,
        })
    }

    pub fn start_edit(&mut self) -> Result<(), FlowError> {
        self.transition("start_edit", |state| match state {
            ModalState::Viewing(id) => Some(ModalState::Editing(id.clone())),
            _ => None,
        })
    }

    /// Opens the delete confirmation, from the list (swipe) or the detail view.
    pub fn request_delete(&mut self, id: Id) -> Result<(), FlowError> {
        self.transition("request_delete", move |state| match state {
            ModalState::Closed => Some(ModalState::ConfirmingDelete {
                id,
                from_detail: false,
            }),
            ModalState::Viewing(current) if *current == id => Some(ModalState::ConfirmingDelete {
                id,
                from_detail: true,
            }),
            _ => None,
        })
    }

    /// Backs out one level: edit returns to detail, a delete dialog returns
    /// to where it was opened from, anything else closes.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        self.transition("cancel", |state| match state {
            ModalState::Closed => None,
            ModalState::Editing(id) => Some(ModalState::Viewing(id.clone())),
            ModalState::ConfirmingDelete {
                id,
                from_detail: true,
            } => Some(ModalState::Viewing(id.clone())),
            _ => Some(ModalState::Closed),
        })
    }

    /// Closes everything. An outstanding write keeps running, but its result
    /// will no longer change this flow.
    pub fn close(&mut self) {
        self.state = ModalState::Closed;
        self.submitting = false;
        self.error = None;
        self.generation += 1;
    }

    /// Records a local validation failure without touching the state.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Marks a write as in flight from `Adding`, `Editing` or `ConfirmingDelete`.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, FlowError> {
        if self.submitting {
            return Err(FlowError::AlreadySubmitting);
        }
        match self.state {
            ModalState::Adding | ModalState::Editing(_) | ModalState::ConfirmingDelete { .. } => {}
            _ => {
                return Err(FlowError::InvalidTransition {
                    from: self.state.name(),
                    action: "submit",
                });
            }
        }
        self.submitting = true;
        self.error = None;
        Ok(SubmitTicket {
            generation: self.generation,
        })
    }

    /// Applies a write result. Returns `false` when the ticket is stale.
    ///
    /// Success closes the modal; failure keeps it open with `error` set.
    pub fn finish_submit(&mut self, ticket: SubmitTicket, result: Result<(), String>) -> bool {
        if ticket.generation != self.generation || !self.submitting {
            return false;
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                self.state = ModalState::Closed;
                self.error = None;
                self.generation += 1;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }

    /// Runs one synchronous write through `begin_submit`/`finish_submit`.
    ///
    /// `op` receives the state the submission started from and is called
    /// exactly once when the flow accepts the submission.
    pub fn run_submit<T, E: Display>(
        &mut self,
        op: impl FnOnce(&ModalState<Id>) -> Result<T, E>,
    ) -> Result<T, SubmitError<E>> {
        let ticket = self.begin_submit()?;
        match op(&self.state) {
            Ok(value) => {
                self.finish_submit(ticket, Ok(()));
                Ok(value)
            }
            Err(err) => {
                self.finish_submit(ticket, Err(err.to_string()));
                Err(SubmitError::Operation(err))
            }
        }
    }

    /// Confirms the open delete dialog, calling `delete` once with its id.
    pub fn confirm_delete<E: Display>(
        &mut self,
        delete: impl FnOnce(&Id) -> Result<(), E>,
    ) -> Result<(), SubmitError<E>> {
        let id = match &self.state {
            ModalState::ConfirmingDelete { id, .. } => id.clone(),
            other => {
                return Err(SubmitError::Flow(FlowError::InvalidTransition {
                    from: other.name(),
                    action: "confirm_delete",
                }));
            }
        };
        self.run_submit(|_| delete(&id))
    }

    fn transition(
        &mut self,
        action: &'static str,
        next: impl FnOnce(&ModalState<Id>) -> Option<ModalState<Id>>,
    ) -> Result<(), FlowError> {
        if self.submitting {
            return Err(FlowError::AlreadySubmitting);
        }
        match next(&self.state) {
            Some(state) => {
                self.state = state;
                self.error = None;
                Ok(())
            }
            None => Err(FlowError::InvalidTransition {
                from: self.state.name(),
                action,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FlowError, ModalFlow, ModalState};

    #[test]
    fn edit_cancel_returns_to_detail() {
        let mut flow = ModalFlow::new();
        flow.open_detail(7).unwrap();
        flow.start_edit().unwrap();
        flow.cancel().unwrap();
        assert_eq!(flow.state(), &ModalState::Viewing(7));
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let mut flow = ModalFlow::<u32>::new();
        flow.open_add().unwrap();
        let _ticket = flow.begin_submit().unwrap();
        assert_eq!(flow.begin_submit().unwrap_err(), FlowError::AlreadySubmitting);
    }

    #[test]
    fn stale_ticket_is_ignored_after_close() {
        let mut flow = ModalFlow::<u32>::new();
        flow.open_add().unwrap();
        let ticket = flow.begin_submit().unwrap();
        flow.close();
        flow.open_add().unwrap();

        assert!(!flow.finish_submit(ticket, Err("late failure".to_string())));
        assert_eq!(flow.state(), &ModalState::Adding);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn start_edit_requires_detail_view() {
        let mut flow = ModalFlow::<u32>::new();
        let err = flow.start_edit().unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTransition {
                from: "closed",
                action: "start_edit"
            }
        );
    }
}
