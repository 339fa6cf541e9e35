//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::paths::log_file_path;
use super::subscriber::target;
use super::types::{Log, ProjectEntry, ProjectStatus};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Console and file output both go through [`tracing`]; the file copy at
/// `$XDG_CACHE_HOME/gitlab-enforcer/<command>.log` always includes debug
/// events regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    projects: Mutex<Vec<ProjectEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            projects: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded project entries (test-only).
    #[cfg(test)]
    pub(crate) fn project_entries(&self) -> Vec<ProjectEntry> {
        self.projects.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: target::STAGE, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: target::DRY_RUN, "{msg}");
    }

    /// Announce a sync run against `group` on `endpoint`.
    pub fn run_started(&self, group: &str, endpoint: &str, dry_run: bool) {
        tracing::info!(target: target::RUN, group, endpoint, dry_run, "syncing");
    }

    /// Record a project result for the summary.
    pub fn record_project(&self, name: &str, status: ProjectStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.projects.lock() {
            guard.push(ProjectEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print the summary of all recorded projects.
    pub fn print_summary(&self) {
        let projects = match self.projects.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if projects.is_empty() {
            return;
        }

        self.stage("Summary");

        for project in &projects {
            tracing::info!(
                target: target::OUTCOME,
                status = project.status.label(),
                detail = project.message.as_deref().unwrap_or_default(),
                "{}",
                project.name
            );
        }

        let count = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();
        self.info(&format!(
            "{} projects: {} ok, {} dry-run, {} failed",
            projects.len(),
            count(ProjectStatus::Ok),
            count(ProjectStatus::DryRun),
            count(ProjectStatus::Failed)
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_project(&self, name: &str, status: ProjectStatus, message: Option<&str>) {
        self.record_project(name, status, message);
    }
}
