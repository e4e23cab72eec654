pub mod debugging;
pub(crate) mod fault;
pub(crate) mod header;
mod join;
pub(crate) mod raw;
pub(crate) mod state;
mod utils;
pub(crate) mod waker_fn;
mod yield_now;

pub use fault::TaskFault;
pub use join::{Task, TryJoin};
pub use state::TaskStatus;
pub use yield_now::{yield_now, Schedule, YieldNow};

/// Mark context for task operation
macro_rules! dbg_context {
    ($header:expr, $name:tt, $($body:tt)*) => {{
        let entered = $crate::task::debugging::TaskDebugger::enter($header, $name);

        defer! {
            if entered {
                $crate::task::debugging::TaskDebugger::leave();
            }
        }

        $($body)*
    }};
}

pub(crate) use dbg_context;
