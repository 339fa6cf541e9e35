//! Core logging types: project entries, status, and the [`Log`] trait.

/// Per-project outcome for summary reporting.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    /// Full project path.
    pub name: String,
    /// Final status of the project.
    pub status: ProjectStatus,
    /// Optional detail message (e.g., the error that failed a step).
    pub message: Option<String>,
}

/// Status of a reconciled project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Every step completed.
    Ok,
    /// Every step completed in dry-run mode; nothing was changed.
    DryRun,
    /// At least one step failed.
    Failed,
}

impl ProjectStatus {
    /// Short name carried in summary events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Inverse of [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Ok, Self::DryRun, Self::Failed]
            .into_iter()
            .find(|status| status.label() == label)
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; tests
/// substitute recorders so engine code can be exercised without a global
/// subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a project result for the summary.
    fn record_project(&self, name: &str, status: ProjectStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_equality() {
        assert_eq!(ProjectStatus::Ok, ProjectStatus::Ok);
        assert_ne!(ProjectStatus::Ok, ProjectStatus::Failed);
        assert_ne!(ProjectStatus::DryRun, ProjectStatus::Ok);
    }

    #[test]
    fn labels_round_trip() {
        for status in [ProjectStatus::Ok, ProjectStatus::DryRun, ProjectStatus::Failed] {
            assert_eq!(ProjectStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(ProjectStatus::from_label("skipped"), None);
    }

    #[test]
    fn project_entry_clone() {
        let entry = ProjectEntry {
            name: "team/app".to_string(),
            status: ProjectStatus::Failed,
            message: Some("HTTP 403".to_string()),
        };
        let cloned = entry.clone();
        assert_eq!(cloned.name, entry.name);
        assert_eq!(cloned.status, entry.status);
        assert_eq!(cloned.message, entry.message);
    }
}
