use std::collections::VecDeque;

use super::TaskKey;

/// An ordered list of tasks, by arena key.
#[derive(Debug)]
pub(super) struct TaskQueue {
    queue: VecDeque<TaskKey>,
}

impl TaskQueue {
    pub(super) fn new_with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Appends at the tail
    pub(super) fn push(&mut self, key: TaskKey) {
        self.queue.push_back(key)
    }

    pub(super) fn pop(&mut self) -> Option<TaskKey> {
        self.queue.pop_front()
    }

    /// Removes the task from wherever it sits in the list.
    ///
    /// Returns `false` if the task is not in this list.
    pub(super) fn remove(&mut self, key: TaskKey) -> bool {
        match self.queue.iter().position(|k| *k == key) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }
}
