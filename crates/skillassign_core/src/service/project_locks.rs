//! Per-project mutual exclusion for reassignment runs.
//!
//! Two concurrent runs on one project would read the same pending set and
//! race on the clear step; callers route every run through `ProjectLocks`.

use crate::model::ProjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of one lock per project, created on first use.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, project_id: ProjectId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(project_id).or_default())
    }

    /// Runs `work` while holding the lock of `project_id`.
    ///
    /// Runs for different projects proceed in parallel. A poisoned lock is
    /// recovered: it guards no data, and the database is the source of truth.
    pub fn with_project<T>(&self, project_id: ProjectId, work: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(project_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        work()
    }
}
