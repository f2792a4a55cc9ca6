//! Append-only storage of sampled task records.
use super::TaskRecord;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// An append-only arena of [`TaskRecord`]s.
///
/// Records are only ever pushed, never moved or removed, so a position
/// handed out once keeps pointing at the same record. Clones share storage.
#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    records: Arc<RwLock<Vec<Arc<TaskRecord>>>>,
}

impl History {
    // Records are pushed whole under the write lock, so a poisoned lock
    // still guards a consistent vector.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<TaskRecord>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record and returns its position.
    pub fn push(&self, record: TaskRecord) -> usize {
        let record = Arc::new(record);
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push(record);
        records.len() - 1
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn get(&self, ix: usize) -> Option<Arc<TaskRecord>> {
        self.read().get(ix).cloned()
    }

    /// Copies out the records stored so far.
    pub fn snapshot(&self) -> Vec<Arc<TaskRecord>> {
        self.read().clone()
    }
}
