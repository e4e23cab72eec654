//! A cooperative, single-threaded, time-sliced task scheduler.
//!
//! Tasks are futures submitted to a [`Scheduler`]. The scheduler resumes them in arrival
//! order, granting each a fixed time slice per dispatch. A task gives up control only at
//! the points it marks:
//!
//! - `Schedule.await` (or [`yield_now`]) suspends the task once its slice is used up.
//! - Awaiting another [`Task`] blocks the task until that one finishes, then yields its
//!   output or re-raises its fault.
//!
//! ```no_run
//! use std::time::Duration;
//! use slicer::{Schedule, Scheduler};
//!
//! let sched = Scheduler::new(Duration::from_millis(1));
//! let child = sched.spawn(async {
//!     let mut sum = 0u64;
//!     for i in 0..1_000_000 {
//!         sum += i;
//!         Schedule.await;
//!     }
//!     sum
//! });
//! let parent = sched.spawn(async move { child.await * 2 });
//!
//! sched.run_until_idle().unwrap();
//! assert_eq!(parent.take_output().unwrap(), 999_999_000_000);
//! ```

#[macro_use(defer)]
extern crate scopeguard;

pub mod error;
pub mod scheduler;
pub mod task;
mod utils;

pub use error::{SchedulerError, TaskError};
pub use scheduler::{Builder, Counts, Cycle, FutureExt, Scheduler, SchedulerConfig};
pub use task::{yield_now, Schedule, Task, TaskFault, TaskStatus, TryJoin, YieldNow};
pub use utils::id::{SchedulerId, TaskId};
