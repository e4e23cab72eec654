use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use super::{
    dbg_context,
    fault::TaskFault,
    raw::RawTask,
    state::{Completion, Record, TakeOutput, TaskStatus},
    utils::invariant_violated,
};
use crate::{
    error::TaskError,
    scheduler::{context, Scheduler, TaskKey},
    utils::id::TaskId,
};

/// An owning handle to a task submitted to a [`Scheduler`].
///
/// Creating a task submits it; there is no other way to add work to a scheduler, so a task
/// can't be submitted twice. The task runs whether or not the handle is kept.
///
/// Awaiting the handle from inside another task of the same scheduler blocks the awaiting
/// task until this one finishes, then yields its output. If this task faulted, the fault
/// is re-raised in the awaiting task. Use [`Task::try_join`] to recover from it instead.
///
/// A task supports a single awaiter at a time.
pub struct Task<T> {
    record: Arc<Completion<T>>,

    /// The task this handle registered as the awaiter
    awaiter: Option<TaskKey>,
}

/// Future returned by [`Task::try_join`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct TryJoin<'a, T>(&'a mut Task<T>);

impl<T> Unpin for Task<T> {}

impl<T> Task<T>
where
    T: Send + 'static,
{
    /// Creates a task running `future` and submits it to `scheduler`.
    ///
    /// The task is picked up at the start of the scheduler's next cycle.
    pub fn new<F>(scheduler: &Scheduler, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (record, raw) = RawTask::allocate(future, scheduler.id());
        scheduler.submit(raw);
        Task {
            record,
            awaiter: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.record.header.id
    }

    /// Returns `true` once the task returned or faulted.
    ///
    /// Safe to call from any thread, including while the task is being resumed.
    pub fn is_done(&self) -> bool {
        self.record.is_done()
    }

    pub fn status(&self) -> TaskStatus {
        self.record.status()
    }

    /// Moves the output out of a finished task.
    ///
    /// Meant for code outside the scheduler, such as the thread that submitted the task. The
    /// status of the task does not change.
    pub fn take_output(&self) -> Result<T, TaskError> {
        match self.record.take() {
            TakeOutput::NotDone => Err(TaskError::NotDone),
            TakeOutput::Value(value) => Ok(value),
            TakeOutput::Fault(fault) => Err(TaskError::Faulted(fault)),
            TakeOutput::Taken => Err(TaskError::Taken),
        }
    }

    /// Awaits the task, resolving to its fault rather than re-raising it.
    pub fn try_join(&mut self) -> TryJoin<'_, T> {
        TryJoin(self)
    }

    fn poll_join(&mut self) -> Poll<Result<T, TaskFault>> {
        dbg_context!(&self.record.header, "poll_join", {
            if !self.record.is_done() {
                let current = context::current_key();
                if self.awaiter == Some(current) && self.record.header.awaiter() != Some(current)
                {
                    invariant_violated("pending dependency lost its awaiter")
                }

                // Blocks the current task until this one finishes. A task resumed by another
                // of its dependencies lands here again and simply blocks once more.
                context::await_dependency(&self.record.header);
                self.awaiter = Some(current);
                return Poll::Pending;
            }

            match self.record.take() {
                TakeOutput::Value(value) => Poll::Ready(Ok(value)),
                TakeOutput::Fault(fault) => Poll::Ready(Err(fault)),
                TakeOutput::Taken => panic!("output of {} was already taken", self.id()),
                TakeOutput::NotDone => invariant_violated("finished task reports NotDone"),
            }
        })
    }
}

impl<T> Future for Task<T>
where
    T: Send + 'static,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<T> {
        match self.get_mut().poll_join() {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(fault)) => fault.resume(),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Future for TryJoin<'_, T>
where
    T: Send + 'static,
{
    type Output = Result<T, TaskFault>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().0.poll_join()
    }
}

impl<T: Send> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.record.header.id)
            .field("status", &self.record.status())
            .finish()
    }
}
