use std::{
    collections::VecDeque,
    fmt,
    future::Future,
    sync::Arc,
    task::Context,
    thread,
    time::{Duration, Instant},
};

use parking_lot::{Mutex, MutexGuard};
use slotmap::SlotMap;

use super::{
    config::{Builder, SchedulerConfig},
    context::{self, Resume, CURRENT},
    queue::TaskQueue,
    TaskKey,
};
use crate::{
    error::SchedulerError,
    task::{
        raw::RawTask,
        state::TaskStatus,
        waker_fn::noop_waker,
        Task,
    },
    utils::id::SchedulerId,
};

/// A cooperative, single-threaded, time-sliced task scheduler.
///
/// Tasks move through three lists:
///
/// 1. *incoming*: submitted but not yet run. The only list shared with other threads.
/// 2. *active*: eligible to run. Every cycle resumes each of them once, in order.
/// 3. *blocked*: waiting on another task. A blocked task goes back to the tail of *active*
///    when the task it waits on finishes.
///
/// `Scheduler` is a cheap handle; clones drive and submit to the same lists. Tasks can be
/// submitted from any thread, but only one context drives the scheduler at a time.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    id: SchedulerId,
    config: SchedulerConfig,

    /// Tasks submitted since the last cycle began
    incoming: Mutex<VecDeque<RawTask>>,

    /// Everything else, owned by the driving context
    lists: Mutex<RunLists>,

    #[cfg(feature = "debugging")]
    driver_thread: once_cell::sync::OnceCell<usize>,
}

struct RunLists {
    /// Owns the frames of every admitted task
    arena: SlotMap<TaskKey, RawTask>,
    active: TaskQueue,
    blocked: TaskQueue,
}

/// What one cycle of the run loop did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cycle {
    /// Tasks moved from incoming to active
    pub admitted: usize,
    pub resumed: usize,
    pub finished: usize,
    /// Tasks that started waiting on a dependency
    pub blocked: usize,
    /// Waiters moved back to active because their dependency finished
    pub reactivated: usize,
}

/// Sizes of the three task lists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub incoming: usize,
    pub active: usize,
    pub blocked: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.incoming + self.active + self.blocked
    }
}

enum Decision {
    Block,
    Finish,
    Next,
}

impl Scheduler {
    /// Creates a scheduler granting `ration` to a task on every dispatch.
    pub fn new(ration: Duration) -> Self {
        Builder::new().ration(ration).build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let capacity = config.queue_capacity;
        let lists = RunLists {
            arena: SlotMap::with_capacity_and_key(capacity),
            active: TaskQueue::new_with_capacity(capacity),
            blocked: TaskQueue::new_with_capacity(capacity),
        };

        Self {
            inner: Arc::new(Inner {
                id: SchedulerId::next(),
                config,
                incoming: Mutex::new(VecDeque::with_capacity(capacity)),
                lists: Mutex::new(lists),
                #[cfg(feature = "debugging")]
                driver_thread: once_cell::sync::OnceCell::new(),
            }),
        }
    }

    pub fn id(&self) -> SchedulerId {
        self.inner.id
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Creates a task running `future` on this scheduler. Same as [`Task::new`].
    pub fn spawn<F, T>(&self, future: F) -> Task<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task::new(self, future)
    }

    pub(crate) fn submit(&self, raw: RawTask) {
        tracing::trace!(scheduler = %self.inner.id, task = %raw.header().id, "submitted");
        self.inner.incoming.lock().push_back(raw);
    }

    /// Sizes of the task lists, or `None` while a cycle is running.
    pub fn counts(&self) -> Option<Counts> {
        let lists = self.inner.lists.try_lock()?;
        Some(Counts {
            incoming: self.inner.incoming.lock().len(),
            active: lists.active.len(),
            blocked: lists.blocked.len(),
        })
    }

    /// Returns `true` if no task is left in any list.
    pub fn is_idle(&self) -> bool {
        self.counts().map_or(false, |counts| counts.total() == 0)
    }

    /// Runs a single cycle.
    ///
    /// # Panics
    ///
    /// Panics if the scheduler is already being driven, or if its dependency bookkeeping is
    /// found to be corrupt.
    pub fn step(&self) -> Cycle {
        let mut lists = self.lock_lists();
        self.cycle(&mut lists)
    }

    /// Runs cycles until every list is empty and returns the number of cycles run.
    ///
    /// Tasks submitted from other threads while this runs are picked up as usual. If no task
    /// is runnable but some are still blocked, their dependencies can never finish here and
    /// [`SchedulerError::Stalled`] is returned.
    pub fn run_until_idle(&self) -> Result<usize, SchedulerError> {
        let mut lists = self.lock_lists();
        let mut cycles = 0;

        loop {
            if lists.active.is_empty() && self.inner.incoming.lock().is_empty() {
                if lists.blocked.is_empty() {
                    tracing::debug!(scheduler = %self.inner.id, cycles, "idle");
                    return Ok(cycles);
                }

                let blocked = lists.blocked.len();
                tracing::warn!(scheduler = %self.inner.id, blocked, "stalled");
                return Err(SchedulerError::Stalled { blocked });
            }

            self.cycle(&mut lists);
            cycles += 1;
        }
    }

    /// Drives the scheduler forever.
    pub fn run(&self) -> ! {
        let mut lists = self.lock_lists();
        tracing::debug!(scheduler = %self.inner.id, label = ?self.inner.config.label, "running");

        loop {
            let cycle = self.cycle(&mut lists);
            if cycle.resumed == 0 {
                // Nothing to do until another thread submits
                thread::yield_now();
            }
        }
    }

    fn lock_lists(&self) -> MutexGuard<'_, RunLists> {
        if context::is_driving(self) {
            panic!(
                "{} can't be driven from inside one of its own tasks",
                self.inner.id
            );
        }

        #[cfg(feature = "debugging")]
        {
            let current = crate::utils::id::current_thread_id();
            let driver = *self.inner.driver_thread.get_or_init(|| current);
            if driver != current {
                panic!("{} is driven from more than one thread", self.inner.id);
            }
        }

        match self.inner.lists.try_lock() {
            Some(lists) => lists,
            None => panic!("{} is already being driven", self.inner.id),
        }
    }

    /// Moves everything submitted so far to the tail of the active list.
    fn admit(&self, lists: &mut RunLists) -> usize {
        let mut incoming = self.inner.incoming.lock();
        let admitted = incoming.len();

        for raw in incoming.drain(..) {
            let key = lists.arena.insert_with_key(|key| {
                raw.header().bind(key);
                raw
            });
            lists.active.push(key);
        }

        admitted
    }

    fn cycle(&self, lists: &mut RunLists) -> Cycle {
        let mut cycle = Cycle {
            admitted: self.admit(lists),
            ..Cycle::default()
        };

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        // Only the tasks active when the cycle starts run in it. Anything appended below,
        // including reactivated waiters, waits for the next cycle.
        for _ in 0..lists.active.len() {
            let key = match lists.active.pop() {
                Some(key) => key,
                None => break,
            };

            let decision = {
                let raw = match lists.arena.get_mut(key) {
                    Some(raw) => raw,
                    None => panic!("active task is missing from the arena"),
                };

                raw.header()
                    .set_deadline(Instant::now().checked_add(self.inner.config.ration));

                let resume = Resume {
                    scheduler: self.clone(),
                    key,
                    record: raw.record.clone(),
                };
                CURRENT.set(&resume, || raw.resume(&mut cx));
                cycle.resumed += 1;

                if raw.record.is_done() {
                    Decision::Finish
                } else if raw.header().is_waiting() {
                    Decision::Block
                } else {
                    Decision::Next
                }
            };

            match decision {
                Decision::Block => {
                    lists.blocked.push(key);
                    cycle.blocked += 1;
                }
                Decision::Finish => {
                    if self.finish(lists, key) {
                        cycle.reactivated += 1;
                    }
                    cycle.finished += 1;
                }
                Decision::Next => lists.active.push(key),
            }
        }

        tracing::trace!(
            scheduler = %self.inner.id,
            admitted = cycle.admitted,
            resumed = cycle.resumed,
            finished = cycle.finished,
            blocked = cycle.blocked,
            reactivated = cycle.reactivated,
            "cycle"
        );

        cycle
    }

    /// Removes a finished task and hands control back to its awaiter, if any.
    ///
    /// Returns `true` if an awaiter was reactivated.
    fn finish(&self, lists: &mut RunLists, key: TaskKey) -> bool {
        let raw = match lists.arena.remove(key) {
            Some(raw) => raw,
            None => panic!("finished task is missing from the arena"),
        };
        let header = raw.header();

        let awaiter = match header.awaiter() {
            Some(awaiter) => awaiter,
            None => {
                if raw.record.status() == TaskStatus::HasFault {
                    // Nobody will ever see it
                    tracing::debug!(task = %header.id, "task faulted without an awaiter");
                } else {
                    tracing::trace!(task = %header.id, "finished");
                }
                return false;
            }
        };

        if !lists.blocked.remove(awaiter) {
            match lists.arena.get(awaiter) {
                // Another dependency of the same awaiter already reactivated it
                Some(waiter) if !waiter.header().is_waiting() => {
                    header.clear_awaiter();
                    tracing::trace!(
                        task = %header.id,
                        awaiter = %waiter.header().id,
                        "finished, awaiter already active"
                    );
                    return false;
                }
                Some(_) => panic!(
                    "{} finished but its awaiter is not blocked; dependency bookkeeping is corrupt",
                    header.id
                ),
                // The awaiter finished without waiting for this task any longer
                None => {
                    header.clear_awaiter();
                    tracing::trace!(task = %header.id, "finished, awaiter already gone");
                    return false;
                }
            }
        }
        let waiter = match lists.arena.get(awaiter) {
            Some(waiter) => waiter,
            None => panic!(
                "{} finished but its awaiter is gone; dependency bookkeeping is corrupt",
                header.id
            ),
        };

        lists.active.push(awaiter);
        waiter.header().set_waiting(false);
        header.clear_awaiter();

        tracing::trace!(
            task = %header.id,
            awaiter = %waiter.header().id,
            "finished, awaiter reactivated"
        );
        true
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("counts", &self.counts())
            .finish()
    }
}

#[cfg(test)]
impl Scheduler {
    /// Records `awaiter` as waiting on `task` and flags it as waiting, without moving it to
    /// the blocked list.
    pub(super) fn corrupt_awaiter(&self, task: crate::TaskId, awaiter: crate::TaskId) {
        let lists = self.lock_lists();
        let key_of = |id| {
            lists
                .arena
                .iter()
                .find(|(_, raw)| raw.header().id == id)
                .map(|(key, _)| key)
                .expect("task is not admitted")
        };
        let (task, awaiter) = (key_of(task), key_of(awaiter));
        lists.arena[task].header().register(awaiter);
        lists.arena[awaiter].header().set_waiting(true);
    }
}
