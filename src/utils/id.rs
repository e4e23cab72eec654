use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use once_cell::sync::Lazy;

static SCHEDULER_ID_GEN: Lazy<AtomicUsize> = Lazy::new(|| AtomicUsize::new(1));
static TASK_ID_GEN: Lazy<AtomicUsize> = Lazy::new(|| AtomicUsize::new(1));

/// Process-unique identity of a [`Scheduler`](crate::Scheduler).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchedulerId(usize);

/// Process-unique identity of a task, stable for the lifetime of its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl SchedulerId {
    pub(crate) fn next() -> Self {
        SchedulerId(SCHEDULER_ID_GEN.fetch_add(1, Ordering::AcqRel))
    }
}

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(TASK_ID_GEN.fetch_add(1, Ordering::AcqRel))
    }

    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

impl fmt::Display for SchedulerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sched#{}", self.0)
    }
}

#[cfg(feature = "debugging")]
pub(crate) fn current_thread_id() -> usize {
    static THREAD_ID_GEN: Lazy<AtomicUsize> = Lazy::new(|| AtomicUsize::new(1));

    thread_local! {
        static THREAD_ID: usize = THREAD_ID_GEN.fetch_add(1, Ordering::AcqRel);
    }

    THREAD_ID.with(|id| *id)
}
