use std::task::{RawWaker, RawWakerVTable, Waker};

/// A waker that does nothing.
///
/// Tasks are not woken: the scheduler decides when to resume them from its lists, so any
/// wake-up a task body requests is redundant.
pub(crate) fn noop_waker() -> Waker {
    const VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);

    fn clone(_: *const ()) -> RawWaker {
        raw_waker()
    }

    fn noop(_: *const ()) {}

    fn raw_waker() -> RawWaker {
        // the pointer is never dereferenced so null is ok
        RawWaker::new(std::ptr::null::<()>(), &VTABLE)
    }

    unsafe { Waker::from_raw(raw_waker()) }
}
