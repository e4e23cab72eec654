//! The task currently being resumed.
//!
//! The scheduler sets [`CURRENT`] for the duration of every resume. Yield points and nested
//! awaits use it to find the record of the task they run in.

use std::{sync::Arc, time::Instant};

use super::{Scheduler, TaskKey};
use crate::task::{header::Header, state::Record};

scoped_tls::scoped_thread_local!(pub(super) static CURRENT: Resume);

pub(super) struct Resume {
    pub(super) scheduler: Scheduler,
    pub(super) key: TaskKey,
    pub(super) record: Arc<dyn Record>,
}

fn with_current<F, R>(what: &str, f: F) -> R
where
    F: FnOnce(&Resume) -> R,
{
    if !CURRENT.is_set() {
        panic!("{} outside of a task resumed by a scheduler", what);
    }
    CURRENT.with(f)
}

/// Returns `true` while the current task's time slice has budget left.
pub(crate) fn within_slice() -> bool {
    with_current("yield point reached", |current| {
        current.record.header().within_slice(Instant::now())
    })
}

pub(crate) fn current_key() -> TaskKey {
    with_current("task awaited", |current| current.key)
}

/// Blocks the current task on `dependency`.
///
/// Registers the current task as the dependency's awaiter and flags it as waiting, so the
/// scheduler moves it to the blocked list once this resume returns.
pub(crate) fn await_dependency(dependency: &Header) {
    with_current("task awaited", |current| {
        let header = current.record.header();

        if dependency.scheduler != current.scheduler.id() {
            panic!(
                "{} belongs to {} and can't be awaited from {} on {}",
                dependency.id,
                dependency.scheduler,
                header.id,
                current.scheduler.id()
            );
        }
        if dependency.id == header.id {
            panic!("{} awaits itself", header.id);
        }

        dependency.register(current.key);
        header.set_waiting(true);

        tracing::trace!(task = %header.id, dependency = %dependency.id, "waiting on dependency");
    })
}

/// The scheduler driving the current task.
pub(crate) fn scheduler() -> Scheduler {
    with_current("spawn called", |current| current.scheduler.clone())
}

/// Returns `true` if the calling code runs inside a task of `scheduler`.
pub(super) fn is_driving(scheduler: &Scheduler) -> bool {
    CURRENT.is_set() && CURRENT.with(|current| current.scheduler.id() == scheduler.id())
}
