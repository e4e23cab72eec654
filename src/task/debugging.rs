use std::{cell::RefCell, collections::HashMap, time::Instant};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::header::Header;
use crate::utils::id::TaskId;

static DEBUGGER: Lazy<Mutex<TaskDebugger>> = Lazy::new(|| {
    Mutex::new(TaskDebugger {
        registry: HashMap::new(),
        filter: has_label,
        task_count: 0,
    })
});

thread_local! {
    /// Label for the next task spawned from this thread
    static NEXT_LABEL: RefCell<Option<&'static str>> = RefCell::new(None);

    /// Operations currently entered on this thread
    static CONTEXT: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
}

/// Tracks live tasks and logs the operations performed on the ones that pass the filter.
///
/// By default only labeled tasks are tracked. Output goes through `log` at debug level.
pub struct TaskDebugger {
    registry: HashMap<TaskId, TaskInfo>,
    filter: fn(Option<&'static str>) -> bool,
    task_count: usize,
}

#[derive(Debug)]
struct TaskInfo {
    id: TaskId,
    label: Option<&'static str>,
    ts: Instant,
}

fn has_label(label: Option<&'static str>) -> bool {
    label.is_some()
}

impl TaskInfo {
    fn new(id: TaskId, label: Option<&'static str>) -> Self {
        Self {
            id,
            label,
            ts: Instant::now(),
        }
    }
}

impl TaskDebugger {
    fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        f(&mut DEBUGGER.lock())
    }

    /// Set label for the next task spawned from this thread. Labels are used for filtering
    /// tasks to inspect
    pub fn set_label(label: &'static str) {
        NEXT_LABEL.with(|next| *next.borrow_mut() = Some(label));
    }

    pub fn set_filter(filter: fn(Option<&'static str>) -> bool) {
        Self::with(|dbg| {
            dbg.filter = filter;
        });
    }

    pub fn debug_aged_tasks(older_than: std::time::Duration) -> usize {
        Self::with(|dbg| {
            let mut count = 0;
            for info in dbg.registry.values() {
                let age = info.ts.elapsed();
                if age > older_than {
                    count += 1;
                    log::debug!(
                        "[{}][label:{}] age: {:?}",
                        info.id,
                        info.label.unwrap_or(""),
                        age
                    );
                }
            }
            if count > 0 {
                log::debug!("found {} tasks older than {:?}", count, older_than)
            }
            count
        })
    }

    /// Number of live tasks, tracked or not
    pub fn task_count() -> usize {
        Self::with(|dbg| dbg.task_count)
    }

    /// Whether the task is tracked by the debugger
    pub fn is_tracked(id: TaskId) -> bool {
        Self::with(|dbg| dbg.registry.contains_key(&id))
    }

    pub(super) fn register(header: &Header) -> bool {
        let label = NEXT_LABEL.with(|next| next.borrow_mut().take());
        Self::with(|dbg| {
            dbg.task_count += 1;
            if (dbg.filter)(label) {
                dbg.registry.insert(header.id, TaskInfo::new(header.id, label));
                header.set_debugging(true);
                true
            } else {
                false
            }
        })
    }

    pub(super) fn unregister(header: &Header) {
        Self::with(|dbg| {
            dbg.task_count -= 1;
            dbg.registry.remove(&header.id);
        });
    }

    pub(crate) fn enter(header: &Header, ctx: &'static str) -> bool {
        if !header.debugging.load(std::sync::atomic::Ordering::Relaxed) {
            return false;
        }

        let label = Self::with(|dbg| dbg.registry.get(&header.id).map(|info| info.label));
        match label {
            Some(label) => {
                CONTEXT.with(|context| {
                    let mut context = context.borrow_mut();
                    context.push(ctx);
                    log::debug!(
                        "[{}][{}][label:{}][{}]",
                        header.id,
                        header.to_compact_string(),
                        label.unwrap_or(""),
                        context.join("|"),
                    )
                });
                true
            }
            None => false,
        }
    }

    pub(crate) fn leave() {
        CONTEXT.with(|context| {
            context.borrow_mut().pop();
        });
    }
}
