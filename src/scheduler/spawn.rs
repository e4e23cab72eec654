use std::future::Future;

use super::context;
use crate::task::Task;

pub trait FutureExt: Future + Sized + Send + 'static {
    /// Spawns a task onto the scheduler driving the current task.
    ///
    /// Equivalent to [`Task::new`] with that scheduler.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a task resumed by a [`Scheduler`](super::Scheduler).
    fn spawn(self) -> Task<Self::Output>
    where
        Self::Output: Send + 'static,
    {
        Task::new(&context::scheduler(), self)
    }
}

impl<F> FutureExt for F where F: Future + Send + 'static {}
