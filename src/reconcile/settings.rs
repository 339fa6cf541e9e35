//! General-settings and approval-settings synchronization.
//!
//! Both sections follow the same three phases: fetch and record into the
//! "before" store, submit the desired state (skipped in dry-run), then fetch
//! again and record into the "after" store.
use std::fmt::Debug;

use super::snapshot::{Phase, ProjectSnapshot};
use super::{Context, Step};
use crate::config::Config;
use crate::config::settings::{ApprovalSettings, GeneralSettings};
use crate::error::{ConfigError, EnforcerError};
use crate::gitlab::{ApiError, GitLabApi, Project};

/// A settings section that can be fetched, submitted, and snapshotted.
trait Section: Debug + Sized {
    /// Config table name, used in messages and errors.
    const NAME: &'static str;

    fn desired(config: &Config) -> Option<&Self>;
    fn fetch(api: &dyn GitLabApi, project_id: u64) -> Result<Self, ApiError>;
    fn submit(api: &dyn GitLabApi, project_id: u64, desired: &Self) -> Result<Self, ApiError>;
    fn slot(snapshot: &mut ProjectSnapshot) -> &mut Option<Self>;
}

impl Section for GeneralSettings {
    const NAME: &'static str = "project_settings";

    fn desired(config: &Config) -> Option<&Self> {
        config.project_settings.as_ref()
    }

    fn fetch(api: &dyn GitLabApi, project_id: u64) -> Result<Self, ApiError> {
        api.get_project(project_id)
    }

    fn submit(api: &dyn GitLabApi, project_id: u64, desired: &Self) -> Result<Self, ApiError> {
        api.edit_project(project_id, desired)
    }

    fn slot(snapshot: &mut ProjectSnapshot) -> &mut Option<Self> {
        &mut snapshot.general
    }
}

impl Section for ApprovalSettings {
    const NAME: &'static str = "approval_settings";

    fn desired(config: &Config) -> Option<&Self> {
        config.approval_settings.as_ref()
    }

    fn fetch(api: &dyn GitLabApi, project_id: u64) -> Result<Self, ApiError> {
        api.get_approval_configuration(project_id)
    }

    fn submit(api: &dyn GitLabApi, project_id: u64, desired: &Self) -> Result<Self, ApiError> {
        api.change_approval_configuration(project_id, desired)
    }

    fn slot(snapshot: &mut ProjectSnapshot) -> &mut Option<Self> {
        &mut snapshot.approval
    }
}

fn apply<S: Section>(ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
    let desired =
        S::desired(&ctx.config).ok_or_else(|| ConfigError::MissingSection(S::NAME.to_string()))?;
    let path = &project.full_path;

    let current = S::fetch(ctx.api.as_ref(), project.id)?;
    ctx.log.debug(&format!("{path}: current {}: {current:?}", S::NAME));
    ctx.snapshots
        .record(Phase::Before, path, |s| *S::slot(s) = Some(current));

    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("{path}: would update {}", S::NAME));
    } else {
        let returned = S::submit(ctx.api.as_ref(), project.id, desired)?;
        ctx.log
            .debug(&format!("{path}: submitted {}: {returned:?}", S::NAME));
    }

    let updated = S::fetch(ctx.api.as_ref(), project.id)?;
    ctx.snapshots
        .record(Phase::After, path, |s| *S::slot(s) = Some(updated));
    Ok(())
}

/// Bring the general settings of `project` to the configured state.
///
/// # Errors
///
/// Returns [`EnforcerError::Config`] if `[project_settings]` is absent and
/// [`EnforcerError::Remote`] if a fetch or the update fails.
pub fn apply_settings(ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
    apply::<GeneralSettings>(ctx, project)
}

/// Bring the approval configuration of `project` to the configured state.
///
/// # Errors
///
/// Returns [`EnforcerError::Config`] if `[approval_settings]` is absent and
/// [`EnforcerError::Remote`] if a fetch or the update fails.
pub fn apply_approval_settings(ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
    apply::<ApprovalSettings>(ctx, project)
}

/// Sync `[project_settings]`.
#[derive(Debug)]
pub struct SyncProjectSettings;

impl Step for SyncProjectSettings {
    fn name(&self) -> &'static str {
        "project settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.project_settings.is_some()
    }

    fn run(&self, ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
        apply_settings(ctx, project)
    }
}

/// Sync `[approval_settings]`.
#[derive(Debug)]
pub struct SyncApprovalSettings;

impl Step for SyncApprovalSettings {
    fn name(&self) -> &'static str {
        "approval settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.approval_settings.is_some()
    }

    fn run(&self, ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
        apply_approval_settings(ctx, project)
    }
}
