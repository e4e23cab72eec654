use std::{
    fmt,
    future::Future,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use super::{
    dbg_context,
    debugging::TaskDebugger,
    fault::TaskFault,
    header::Header,
    state::{Completion, Record},
    utils::abort_on_panic,
};
use crate::utils::id::SchedulerId;

/// The continuation frame of a task, type-erased so the scheduler arena can hold any task.
pub(crate) type Frame = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A live task as the scheduler owns it: its frame plus a share of its record.
///
/// The frame is dropped together with the `RawTask` once the task finishes; the record
/// lives on for as long as a [`Task`](crate::Task) handle refers to it.
pub(crate) struct RawTask {
    pub(crate) record: Arc<dyn Record>,
    frame: Frame,
}

/// Drives the task body and turns its end, normal or not, into a terminal outcome.
struct Harness<F, T> {
    /// `None` once the body has finished and been dropped
    future: Option<Pin<Box<F>>>,
    record: Arc<Completion<T>>,
}

impl RawTask {
    /// Allocates the record and frame of a new task.
    pub(crate) fn allocate<F, T>(future: F, scheduler: SchedulerId) -> (Arc<Completion<T>>, Self)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let record = Arc::new(Completion::new(Header::new(scheduler)));

        if TaskDebugger::register(&record.header) {
            dbg_context!(&record.header, "allocate", {});
        }

        let harness = Harness {
            future: Some(Box::pin(future)),
            record: record.clone(),
        };

        let raw = RawTask {
            record: record.clone(),
            frame: Box::pin(harness),
        };
        (record, raw)
    }

    pub(crate) fn header(&self) -> &Header {
        self.record.header()
    }

    /// Resumes the task once.
    ///
    /// Faults in the body never escape this call; they are captured into the record.
    pub(crate) fn resume(&mut self, cx: &mut Context<'_>) {
        dbg_context!(self.record.header(), "resume", {
            let _ = self.frame.as_mut().poll(cx);
        })
    }
}

impl<F, T> Future for Harness<F, T>
where
    F: Future<Output = T>,
    T: Send,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let future = match this.future.as_mut() {
            Some(future) => future,
            // Finished on an earlier resume
            None => return Poll::Ready(()),
        };

        let poll = panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx)));

        match poll {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(value)) => {
                this.drop_future();
                this.record.complete(value);
                Poll::Ready(())
            }
            Err(payload) => {
                this.drop_future();
                this.record.fault(TaskFault::from_panic(payload));
                Poll::Ready(())
            }
        }
    }
}

impl<F, T> Harness<F, T> {
    fn drop_future(&mut self) {
        // Destructors can panic
        abort_on_panic(|| drop(self.future.take()))
    }
}

impl Drop for RawTask {
    fn drop(&mut self) {
        TaskDebugger::unregister(self.record.header());
    }
}

impl fmt::Debug for RawTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawTask")
            .field("id", &self.header().id)
            .field("status", &self.record.status())
            .finish()
    }
}
