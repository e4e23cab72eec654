use std::time::Duration;

use super::Scheduler;

const DEFAULT_RATION: Duration = Duration::from_millis(1);
const DEFAULT_TASK_QUEUE_SIZE: usize = 4096;

/// Settings fixed for the lifetime of a [`Scheduler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time slice granted to a task on every dispatch
    pub ration: Duration,

    /// Initial capacity of each task list
    pub queue_capacity: usize,

    /// Name used in log output
    pub label: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ration: DEFAULT_RATION,
            queue_capacity: DEFAULT_TASK_QUEUE_SIZE,
            label: None,
        }
    }
}

/// Builds a [`Scheduler`] from a [`SchedulerConfig`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: SchedulerConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ration(mut self, ration: Duration) -> Self {
        self.config.ration = ration;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn build(self) -> Scheduler {
        Scheduler::with_config(self.config)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{Builder, SchedulerConfig};
    use crate::Scheduler;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.ration, Duration::from_millis(1));
        assert_eq!(config.queue_capacity, 4096);
        assert_eq!(config.label, None);

        let sched = Scheduler::new(Duration::from_micros(250));
        assert_eq!(sched.config().ration, Duration::from_micros(250));
        assert_eq!(sched.config().queue_capacity, 4096);
    }

    #[test]
    fn test_builder() {
        let sched = Builder::new()
            .ration(Duration::from_millis(5))
            .queue_capacity(16)
            .label("render")
            .build();

        assert_eq!(
            sched.config(),
            &SchedulerConfig {
                ration: Duration::from_millis(5),
                queue_capacity: 16,
                label: Some("render".to_owned()),
            }
        );
    }
}
