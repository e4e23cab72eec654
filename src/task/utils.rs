use std::mem;

/// Aborts the process.
///
/// Used where unwinding would leave the dependency graph in a state no task can observe
/// consistently.
#[cold]
pub(crate) fn abort() -> ! {
    std::process::abort()
}

/// Calls a function and aborts if it panics.
#[inline]
pub(crate) fn abort_on_panic<T>(f: impl FnOnce() -> T) -> T {
    struct Bomb;

    impl Drop for Bomb {
        fn drop(&mut self) {
            abort();
        }
    }

    let bomb = Bomb;
    let t = f();
    mem::forget(bomb);
    t
}

/// Reports a broken scheduling invariant observed from inside a task and aborts.
///
/// A panic here would be captured as an ordinary task fault, so the process is taken down
/// instead.
#[cold]
pub(crate) fn invariant_violated(msg: &str) -> ! {
    tracing::error!("scheduler invariant violated: {}", msg);
    log::logger().flush();
    abort()
}
