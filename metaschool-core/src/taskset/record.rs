//! Composite task records.
use crate::TaskConfig;
use serde::{Deserialize, Serialize};

/// The full recipe of one task.
///
/// A record holds the config of the base environment, and one config per
/// wrapper factory in pipeline order: `wrapper_configs()[i]` always belongs
/// to the `i`-th wrapper factory of the taskset that produced the record.
/// Records are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRecord {
    base: TaskConfig,
    wrappers: Vec<TaskConfig>,
}

impl TaskRecord {
    /// Creates a record from a base config and ordered wrapper configs.
    pub fn new(base: TaskConfig, wrappers: Vec<TaskConfig>) -> Self {
        Self { base, wrappers }
    }

    /// Config of the base environment.
    pub fn base_config(&self) -> &TaskConfig {
        &self.base
    }

    /// Configs of the wrappers, in pipeline order.
    pub fn wrapper_configs(&self) -> &[TaskConfig] {
        &self.wrappers
    }

    /// Number of wrapper stages.
    pub fn num_wrappers(&self) -> usize {
        self.wrappers.len()
    }

    /// Decomposes the record into its base and wrapper configs.
    pub fn into_parts(self) -> (TaskConfig, Vec<TaskConfig>) {
        (self.base, self.wrappers)
    }
}
