use slotmap::new_key_type;

mod config;
pub(crate) mod context;
mod executor;
mod queue;
mod spawn;


pub use config::{Builder, SchedulerConfig};
pub use executor::{Counts, Cycle, Scheduler};
pub use spawn::FutureExt;

new_key_type! {
    /// Slot of a live task in the scheduler arena.
    ///
    /// The incoming, active and blocked lists, and the awaiter back-references, all refer to
    /// tasks by this key. A key never owns the task it names.
    pub(crate) struct TaskKey;
}
