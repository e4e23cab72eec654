use std::{
    future::{Future, IntoFuture},
    pin::Pin,
    task::{Context, Poll},
};

use crate::scheduler::context;

/// Marks a yield point inside a task.
///
/// `Schedule.await` offers the scheduler a chance to suspend the task. The task keeps running
/// if its current time slice has budget left, and is suspended otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct Schedule;

impl IntoFuture for Schedule {
    type Output = ();
    type IntoFuture = YieldNow;

    fn into_future(self) -> YieldNow {
        yield_now()
    }
}

/// Offers the scheduler a chance to suspend the current task. Same as `Schedule.await`.
///
/// # Panics
///
/// Awaiting it outside of a task resumed by a [`Scheduler`](crate::Scheduler) panics.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            // Nothing is exchanged at a yield point
            return Poll::Ready(());
        }

        if context::within_slice() {
            Poll::Ready(())
        } else {
            self.yielded = true;
            Poll::Pending
        }
    }
}
