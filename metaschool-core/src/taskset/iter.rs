//! Iteration over the tasks seen by a [`GymTaskset`].
use super::{history::History, GymTaskset, TaskRecord};
use crate::{error::TasksetError, Env};
use std::sync::Arc;

/// Iterator over the records of a taskset, in sampling order.
///
/// The number of items is fixed when the iterator is created: records
/// sampled afterwards are not yielded. Cloning the iterator restarts from
/// its current position.
#[derive(Debug, Clone)]
pub struct TaskIter {
    history: History,
    next: usize,
    end: usize,
}

impl TaskIter {
    pub(super) fn new(history: History) -> Self {
        let end = history.len();
        Self {
            history,
            next: 0,
            end,
        }
    }
}

impl Iterator for TaskIter {
    type Item = Arc<TaskRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let record = self.history.get(self.next);
        self.next += 1;
        record
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end.saturating_sub(self.next);
        (n, Some(n))
    }
}

impl ExactSizeIterator for TaskIter {}

/// Iterator rebuilding the environment of every recorded task.
///
/// Yields each record together with the result of
/// [`GymTaskset::make_like`] on it. Same snapshot rules as [`TaskIter`].
pub struct TaskEnvIter<'a, E: Env> {
    taskset: &'a GymTaskset<E>,
    records: TaskIter,
}

impl<'a, E: Env> TaskEnvIter<'a, E> {
    pub(super) fn new(taskset: &'a GymTaskset<E>, records: TaskIter) -> Self {
        Self { taskset, records }
    }
}

impl<'a, E: Env> Clone for TaskEnvIter<'a, E> {
    fn clone(&self) -> Self {
        Self {
            taskset: self.taskset,
            records: self.records.clone(),
        }
    }
}

impl<'a, E: Env> Iterator for TaskEnvIter<'a, E> {
    type Item = (Arc<TaskRecord>, Result<E, TasksetError>);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let env = self.taskset.make_like(&record);
        Some((record, env))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<'a, E: Env> ExactSizeIterator for TaskEnvIter<'a, E> {}
