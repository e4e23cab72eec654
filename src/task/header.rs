use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::{
    scheduler::TaskKey,
    utils::id::{SchedulerId, TaskId},
};

/// Scheduling bookkeeping shared by every task, independent of its output type.
pub(crate) struct Header {
    pub(crate) id: TaskId,

    /// The scheduler this task was submitted to
    pub(crate) scheduler: SchedulerId,

    /// Slot in the scheduler arena, bound once when the task leaves the incoming queue
    key: OnceCell<TaskKey>,

    /// Set while the task is blocked on a nested task.
    ///
    /// Only touched from the driving context.
    waiting: AtomicBool,

    /// Time slice of the current dispatch
    slice: Mutex<Slice>,

    /// The task blocked on this task's completion.
    ///
    /// This is a plain arena key and never keeps the awaiter alive.
    awaiter: Mutex<Option<TaskKey>>,

    pub(crate) debugging: AtomicBool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slice {
    /// Never dispatched
    Idle,
    Until(Instant),
    /// The ration reaches past what `Instant` can represent
    Unbounded,
}

impl Header {
    pub(crate) fn new(scheduler: SchedulerId) -> Self {
        Self {
            id: TaskId::next(),
            scheduler,
            key: OnceCell::new(),
            waiting: AtomicBool::new(false),
            slice: Mutex::new(Slice::Idle),
            awaiter: Mutex::new(None),
            debugging: AtomicBool::new(false),
        }
    }

    pub(crate) fn key(&self) -> Option<TaskKey> {
        self.key.get().copied()
    }

    /// Binds the task to its arena slot. A task is admitted exactly once.
    pub(crate) fn bind(&self, key: TaskKey) {
        if self.key.set(key).is_err() {
            panic!("{} was admitted to the scheduler twice", self.id);
        }
    }

    pub(crate) fn is_waiting(&self) -> bool {
        self.waiting.load(Ordering::Acquire)
    }

    pub(crate) fn set_waiting(&self, waiting: bool) {
        self.waiting.store(waiting, Ordering::Release)
    }

    /// Starts a new slice ending at `deadline`, or one that never ends if `None`.
    pub(crate) fn set_deadline(&self, deadline: Option<Instant>) {
        *self.slice.lock() = match deadline {
            Some(deadline) => Slice::Until(deadline),
            None => Slice::Unbounded,
        };
    }

    /// Returns `true` while the current slice still has budget left.
    ///
    /// A task that was never dispatched has no budget.
    pub(crate) fn within_slice(&self, now: Instant) -> bool {
        match *self.slice.lock() {
            Slice::Idle => false,
            Slice::Until(deadline) => now < deadline,
            Slice::Unbounded => true,
        }
    }

    /// Registers the task blocked on this task.
    ///
    /// Panics if another task is already waiting here.
    pub(crate) fn register(&self, awaiter: TaskKey) {
        let mut slot = self.awaiter.lock();
        match *slot {
            Some(existing) if existing != awaiter => {
                drop(slot);
                panic!("{} is already awaited by another task", self.id)
            }
            _ => *slot = Some(awaiter),
        }
    }

    pub(crate) fn awaiter(&self) -> Option<TaskKey> {
        *self.awaiter.lock()
    }

    pub(crate) fn clear_awaiter(&self) {
        *self.awaiter.lock() = None;
    }

    pub(crate) fn set_debugging(&self, debug: bool) {
        self.debugging.store(debug, Ordering::Relaxed)
    }

    pub(crate) fn to_compact_string(&self) -> String {
        format!(
            "w:{}|a:{}|k:{}",
            self.is_waiting() as i32,
            self.awaiter().is_some() as i32,
            self.key().is_some() as i32,
        )
    }
}
