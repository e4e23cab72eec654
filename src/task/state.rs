use core::fmt;

use parking_lot::Mutex;

use super::{fault::TaskFault, header::Header};

/// Observable completion state of a task.
///
/// `NotDone` is the only non-terminal state. Once a task reports `HasResult` or `HasFault`
/// it reports it forever, even after the value has been taken out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    NotDone,
    HasResult,
    HasFault,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::NotDone)
    }
}

/// What a task left behind.
///
/// The `Option`s become `None` when the value or fault is moved out. That does not change
/// the status.
pub(crate) enum Outcome<T> {
    Pending,
    Returned(Option<T>),
    Faulted(Option<TaskFault>),
}

#[must_use]
pub(crate) enum TakeOutput<T> {
    NotDone,
    Value(T),
    Fault(TaskFault),
    Taken,
}

impl<T> Outcome<T> {
    pub(crate) fn status(&self) -> TaskStatus {
        match self {
            Outcome::Pending => TaskStatus::NotDone,
            Outcome::Returned(_) => TaskStatus::HasResult,
            Outcome::Faulted(_) => TaskStatus::HasFault,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    /// Transitions `Pending` -> `Returned`.
    pub(crate) fn transition_to_returned(&mut self, value: T) {
        debug_assert!(!self.is_finished(), "task finished twice");
        if !self.is_finished() {
            *self = Outcome::Returned(Some(value));
        }
    }

    /// Transitions `Pending` -> `Faulted`.
    pub(crate) fn transition_to_faulted(&mut self, fault: TaskFault) {
        debug_assert!(!self.is_finished(), "task finished twice");
        if !self.is_finished() {
            *self = Outcome::Faulted(Some(fault));
        }
    }

    pub(crate) fn take(&mut self) -> TakeOutput<T> {
        match self {
            Outcome::Pending => TakeOutput::NotDone,
            Outcome::Returned(value) => match value.take() {
                Some(value) => TakeOutput::Value(value),
                None => TakeOutput::Taken,
            },
            Outcome::Faulted(fault) => match fault.take() {
                Some(fault) => TakeOutput::Fault(fault),
                None => TakeOutput::Taken,
            },
        }
    }
}

/// The per-task completion record.
///
/// Shared between the caller's [`Task`](crate::Task) handle and the scheduler. `finished`,
/// the result and the fault live behind one lock so they can be queried from any thread
/// while the task is being resumed.
pub(crate) struct Completion<T> {
    pub(crate) header: Header,
    outcome: Mutex<Outcome<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn new(header: Header) -> Self {
        Self {
            header,
            outcome: Mutex::new(Outcome::Pending),
        }
    }

    pub(crate) fn complete(&self, value: T) {
        self.outcome.lock().transition_to_returned(value)
    }

    pub(crate) fn fault(&self, fault: TaskFault) {
        self.outcome.lock().transition_to_faulted(fault)
    }

    pub(crate) fn take(&self) -> TakeOutput<T> {
        self.outcome.lock().take()
    }
}

/// Type-erased view of a [`Completion`] used by the scheduler lists.
pub(crate) trait Record: Send + Sync {
    fn header(&self) -> &Header;

    fn status(&self) -> TaskStatus;

    fn is_done(&self) -> bool {
        self.status().is_terminal()
    }
}

impl<T: Send> Record for Completion<T> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn status(&self) -> TaskStatus {
        self.outcome.lock().status()
    }

    fn is_done(&self) -> bool {
        self.outcome.lock().is_finished()
    }
}

impl<T> fmt::Debug for Outcome<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pending => fmt.write_str("Pending"),
            Outcome::Returned(v) => fmt
                .debug_struct("Returned")
                .field("taken", &v.is_none())
                .finish(),
            Outcome::Faulted(f) => fmt.debug_tuple("Faulted").field(f).finish(),
        }
    }
}
