use thiserror::Error;

use crate::task::TaskFault;

/// Why the output of a task could not be taken from its handle.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task has not finished yet")]
    NotDone,

    #[error(transparent)]
    Faulted(#[from] TaskFault),

    #[error("task output was already taken")]
    Taken,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Nothing is runnable but tasks are still blocked.
    ///
    /// Their dependencies either await them back or belong to nothing this scheduler runs.
    #[error("no runnable task left but {blocked} task(s) are blocked on a dependency")]
    Stalled { blocked: usize },
}
