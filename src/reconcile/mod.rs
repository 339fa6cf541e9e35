//! The reconciliation engine: per-project steps and the loop that runs them.
pub mod branches;
pub mod discovery;
pub mod group;
pub mod settings;
pub mod snapshot;

pub use discovery::{filter_projects, list_projects};
pub use group::resolve_group_id;
pub use snapshot::{Phase, ProjectSnapshot, SnapshotStore, Snapshots};

use std::sync::Arc;

use crate::config::Config;
use crate::error::EnforcerError;
use crate::gitlab::{GitLabApi, Project};
use crate::logging::{Log, ProjectStatus};

/// Shared context for one reconciliation run.
pub struct Context {
    /// The remote collaborator.
    pub api: Arc<dyn GitLabApi>,
    /// Desired state, read-only for the whole run.
    pub config: Arc<Config>,
    /// Logger for output and project recording.
    pub log: Arc<dyn Log>,
    /// Log intended mutations instead of issuing them.
    pub dry_run: bool,
    /// Settings captured before and after each change.
    pub snapshots: SnapshotStore,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("api", &"<dyn GitLabApi>")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("snapshots", &self.snapshots)
            .finish()
    }
}

impl Context {
    /// Create a context with empty snapshot stores.
    #[must_use]
    pub fn new(
        api: Arc<dyn GitLabApi>,
        config: Arc<Config>,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            config,
            log,
            dry_run,
            snapshots: SnapshotStore::new(),
        }
    }
}

/// One named unit of work applied to every project.
pub trait Step {
    /// Human-readable step name.
    fn name(&self) -> &'static str;

    /// Whether this step applies under the current config.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Apply the step to `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the step could not bring the project to the
    /// desired state.
    fn run(&self, ctx: &Context, project: &Project) -> Result<(), EnforcerError>;
}

/// The steps run for every project, in order.
#[must_use]
pub fn all_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(branches::EnforceBranches),
        Box::new(settings::SyncProjectSettings),
        Box::new(settings::SyncApprovalSettings),
    ]
}

/// Run every step against `project`.
///
/// A failing step is logged and the remaining steps still run; the project
/// is recorded as failed with the first error.
pub fn reconcile_project(ctx: &Context, steps: &[Box<dyn Step>], project: &Project) -> ProjectStatus {
    let mut first_error = None;
    for step in steps {
        if !step.should_run(ctx) {
            ctx.log.debug(&format!(
                "skipping {}: {} (not configured)",
                step.name(),
                project.full_path
            ));
            continue;
        }
        if let Err(e) = step.run(ctx, project) {
            ctx.log
                .error(&format!("{}: {}: {e}", project.full_path, step.name()));
            first_error.get_or_insert_with(|| format!("{}: {e}", step.name()));
        }
    }

    let status = match (&first_error, ctx.dry_run) {
        (Some(_), _) => ProjectStatus::Failed,
        (None, true) => ProjectStatus::DryRun,
        (None, false) => ProjectStatus::Ok,
    };
    ctx.log
        .record_project(&project.full_path, status, first_error.as_deref());
    status
}

/// Result of a full sync run.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Projects selected for reconciliation, in discovery order.
    pub projects: Vec<Project>,
    /// Number of projects with at least one failed step.
    pub failed: usize,
    /// Rendered change report, if anything changed.
    pub report: Option<String>,
}

/// Resolve the configured group, discover its projects, reconcile each one,
/// and render the change report.
///
/// # Errors
///
/// Returns an error if the group cannot be resolved or the project listing
/// fails. Per-project failures are counted in [`SyncOutcome::failed`] instead.
pub fn sync(ctx: &Context) -> Result<SyncOutcome, EnforcerError> {
    let config = &ctx.config;

    ctx.log.stage("Resolving group");
    let group_id = resolve_group_id(ctx.api.as_ref(), &config.group_name)?;
    ctx.log
        .debug(&format!("group {} has id {group_id}", config.group_name));

    ctx.log.stage("Discovering projects");
    let projects = list_projects(
        ctx.api.as_ref(),
        group_id,
        &config.project_whitelist,
        &config.project_blacklist,
    )?;

    let failed = run(ctx, &all_steps(), &projects);
    let report = crate::report::report(&ctx.snapshots.before(), &ctx.snapshots.after());
    if report.is_none() {
        ctx.log.debug("no changes discovered");
    }

    Ok(SyncOutcome {
        projects,
        failed,
        report,
    })
}

/// Reconcile `projects` one after another.
///
/// Failures are isolated per project. Returns the number of failed projects.
pub fn run(ctx: &Context, steps: &[Box<dyn Step>], projects: &[Project]) -> usize {
    ctx.log.info(&format!("found {} projects", projects.len()));
    let mut failed = 0;
    for (index, project) in projects.iter().enumerate() {
        ctx.log.stage(&format!(
            "project {}/{}: {}",
            index + 1,
            projects.len(),
            project.full_path
        ));
        if reconcile_project(ctx, steps, project) == ProjectStatus::Failed {
            failed += 1;
        }
    }
    failed
}
