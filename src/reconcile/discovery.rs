//! Project discovery with allow/deny filtering.
use crate::error::EnforcerError;
use crate::gitlab::{GitLabApi, Project};

/// List every project under `group_id`, nested subgroups included, then keep
/// the ones selected by `allow` and `deny`.
///
/// # Errors
///
/// Returns [`EnforcerError::Remote`] if any page fails to load; no partial
/// list is returned.
pub fn list_projects(
    api: &dyn GitLabApi,
    group_id: u64,
    allow: &[String],
    deny: &[String],
) -> Result<Vec<Project>, EnforcerError> {
    let mut projects = Vec::new();
    let mut page = 1;
    loop {
        let listing = api.list_group_projects(group_id, page, true)?;
        let last = listing.is_last();
        let next = listing.following();
        projects.extend(listing.items);
        if last {
            break;
        }
        page = next;
    }
    Ok(filter_projects(projects, allow, deny))
}

/// Keep projects whose full path is in `allow` (when non-empty) and not in `deny`.
///
/// Deny always wins. Relative order is preserved.
#[must_use]
pub fn filter_projects(projects: Vec<Project>, allow: &[String], deny: &[String]) -> Vec<Project> {
    projects
        .into_iter()
        .filter(|p| is_selected(&p.full_path, allow, deny))
        .collect()
}

fn is_selected(path: &str, allow: &[String], deny: &[String]) -> bool {
    let allowed = allow.is_empty() || allow.iter().any(|a| a == path);
    allowed && !deny.iter().any(|d| d == path)
}
