//! Default-branch creation and protected-branch enforcement.
use super::{Context, Step};
use crate::config::branches::ProtectedBranchRule;
use crate::error::EnforcerError;
use crate::gitlab::Project;

/// Branch new default branches are created from. Also never created itself.
pub const SOURCE_BRANCH: &str = "master";

/// Ensure the configured default branch exists, then enforce every
/// protected-branch rule.
#[derive(Debug)]
pub struct EnforceBranches;

impl Step for EnforceBranches {
    fn name(&self) -> &'static str {
        "branches"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.create_default_branch || !ctx.config.protected_branches.is_empty()
    }

    fn run(&self, ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
        ensure_default_branch(ctx, project)?;
        ensure_protected_branches(ctx, project, &ctx.config.protected_branches)
    }
}

/// Create the configured default branch from [`SOURCE_BRANCH`] if it is missing.
///
/// Does nothing unless `create_default_branch` is set and the configured
/// default branch is something other than [`SOURCE_BRANCH`]. The existence
/// check runs in dry-run mode too.
///
/// # Errors
///
/// Returns [`EnforcerError::Remote`] if the lookup fails for any reason other
/// than not-found, or if the branch cannot be created.
pub fn ensure_default_branch(ctx: &Context, project: &Project) -> Result<(), EnforcerError> {
    if !ctx.config.create_default_branch {
        return Ok(());
    }
    let Some(branch) = ctx.config.default_branch() else {
        return Ok(());
    };
    if branch == SOURCE_BRANCH {
        return Ok(());
    }

    match ctx.api.get_branch(project.id, branch) {
        Ok(_) => {
            ctx.log.debug(&format!(
                "{}: default branch {branch} already exists",
                project.full_path
            ));
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            if ctx.dry_run {
                ctx.log.dry_run(&format!(
                    "{}: would create branch {branch} from {SOURCE_BRANCH}",
                    project.full_path
                ));
                return Ok(());
            }
            ctx.api.create_branch(project.id, branch, SOURCE_BRANCH)?;
            ctx.log.info(&format!(
                "{}: created branch {branch} from {SOURCE_BRANCH}",
                project.full_path
            ));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Unprotect then protect every rule's branch so the levels match exactly.
///
/// Rules are applied in order. The branch is briefly unprotected between the
/// two calls.
///
/// # Errors
///
/// Returns [`EnforcerError::Remote`] on the first unprotect (other than
/// not-found) or protect failure; later rules are not attempted.
pub fn ensure_protected_branches(
    ctx: &Context,
    project: &Project,
    rules: &[ProtectedBranchRule],
) -> Result<(), EnforcerError> {
    for rule in rules {
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "{}: would protect {} (push: {}, merge: {})",
                project.full_path, rule.name, rule.push_access_level, rule.merge_access_level
            ));
            continue;
        }

        match ctx.api.unprotect_branch(project.id, &rule.name) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
        ctx.api.protect_branch(
            project.id,
            &rule.name,
            rule.push_access_level,
            rule.merge_access_level,
        )?;
        ctx.log.debug(&format!(
            "{}: protected {} (push: {}, merge: {})",
            project.full_path, rule.name, rule.push_access_level, rule.merge_access_level
        ));
    }
    Ok(())
}
