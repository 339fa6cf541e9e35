//! Before/after settings snapshots keyed by project path.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::settings::{ApprovalSettings, GeneralSettings};

/// The settings of one project as GitLab reported them at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSnapshot {
    /// General project settings, once recorded.
    pub general: Option<GeneralSettings>,
    /// Approval settings, once recorded.
    pub approval: Option<ApprovalSettings>,
}

/// Snapshots of every processed project, ordered by full path.
pub type Snapshots = BTreeMap<String, ProjectSnapshot>;

/// Which of the two stores a recording goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// State fetched before any change was submitted.
    Before,
    /// State fetched after the change was submitted.
    After,
}

/// The "before" and "after" stores for a run.
///
/// Entries are created lazily and only ever grow. Each store sits behind its
/// own lock.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    before: Mutex<Snapshots>,
    after: Mutex<Snapshots>,
}

impl SnapshotStore {
    /// Create empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, phase: Phase) -> MutexGuard<'_, Snapshots> {
        let lock = match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        };
        lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert the entry for `project`, letting `overlay` set only the
    /// section being recorded.
    pub fn record(&self, phase: Phase, project: &str, overlay: impl FnOnce(&mut ProjectSnapshot)) {
        let mut store = self.store(phase);
        overlay(store.entry(project.to_string()).or_default());
    }

    /// Copy of the "before" store.
    #[must_use]
    pub fn before(&self) -> Snapshots {
        self.store(Phase::Before).clone()
    }

    /// Copy of the "after" store.
    #[must_use]
    pub fn after(&self) -> Snapshots {
        self.store(Phase::After).clone()
    }
}
