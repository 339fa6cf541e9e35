//! Resolve a slash-separated group path to a numeric group id.
use crate::error::EnforcerError;
use crate::gitlab::GitLabApi;

/// Resolve `path` (e.g. `platform/backend/services`) to the id of its last group.
///
/// The first segment is looked up directly. Each further level is found by
/// listing the subgroups of the current group and selecting the one whose
/// full path equals the path walked so far.
///
/// # Errors
///
/// Returns [`EnforcerError::NotFound`] if the top-level group does not exist,
/// [`EnforcerError::Match`] if a nested segment matches no subgroup, and
/// [`EnforcerError::Remote`] on any other API failure.
pub fn resolve_group_id(api: &dyn GitLabApi, path: &str) -> Result<u64, EnforcerError> {
    let mut segments = path.split('/');
    let base = segments.next().unwrap_or_default();

    let group = api.get_group(base).map_err(|e| {
        if e.is_not_found() {
            EnforcerError::NotFound(format!("group '{base}'"))
        } else {
            EnforcerError::Remote(e)
        }
    })?;

    let mut id = group.id;
    let mut walked = base.to_string();
    for segment in segments {
        walked.push('/');
        walked.push_str(segment);
        id = find_subgroup(api, id, &walked)?.ok_or_else(|| EnforcerError::Match {
            path: path.to_string(),
            segment: walked.clone(),
        })?;
    }
    Ok(id)
}

/// Page through the subgroups of `parent` looking for `full_path`.
fn find_subgroup(
    api: &dyn GitLabApi,
    parent: u64,
    full_path: &str,
) -> Result<Option<u64>, EnforcerError> {
    let mut page = 1;
    loop {
        let listing = api.list_subgroups(parent, page)?;
        if let Some(group) = listing.items.iter().find(|g| g.full_path == full_path) {
            return Ok(Some(group.id));
        }
        if listing.is_last() {
            return Ok(None);
        }
        page = listing.following();
    }
}
