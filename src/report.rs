//! Change report: diff the before/after snapshots and render the result.
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::config::settings::{ApprovalSettings, Field, GeneralSettings};
use crate::reconcile::Snapshots;

/// One changed field of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    /// Full project path.
    pub project: String,
    /// `snake_case` field name.
    pub field: &'static str,
    /// Rendered value before the run; `None` when unset.
    pub old: Option<String>,
    /// Rendered value after the run; `None` when unset.
    pub new: Option<String>,
}

/// Shown in place of a quoted value when a field is unset, so that an unset
/// value and an empty string stay distinguishable.
pub const UNSET: &str = "(unset)";

fn shown(value: Option<&str>) -> String {
    value.map_or_else(|| UNSET.to_string(), |v| format!("\"{v}\""))
}

/// Compare every project present in both stores, field by field.
///
/// A section is compared only when both snapshots hold it.
#[must_use]
pub fn diff(before: &Snapshots, after: &Snapshots) -> Vec<ChangeEntry> {
    let mut entries = Vec::new();
    for (project, new) in after {
        let Some(old) = before.get(project) else {
            continue;
        };
        if let (Some(old), Some(new)) = (&old.general, &new.general) {
            diff_fields(project, GeneralSettings::FIELDS, old, new, &mut entries);
        }
        if let (Some(old), Some(new)) = (&old.approval, &new.approval) {
            diff_fields(project, ApprovalSettings::FIELDS, old, new, &mut entries);
        }
    }
    entries
}

fn diff_fields<T>(
    project: &str,
    fields: &[Field<T>],
    old: &T,
    new: &T,
    out: &mut Vec<ChangeEntry>,
) {
    for field in fields {
        let (before, after) = ((field.value)(old), (field.value)(new));
        if before != after {
            out.push(ChangeEntry {
                project: project.to_string(),
                field: field.name,
                old: before,
                new: after,
            });
        }
    }
}

/// Render `entries` grouped by project.
///
/// Projects and fields are sorted by name, and the label column is as wide as
/// the longest field name plus two. Values are quoted; unset values show as
/// [`UNSET`]. Returns `None` when there is nothing to report.
///
/// # Examples
///
/// ```
/// use gitlab_enforcer::report::{ChangeEntry, render};
///
/// assert!(render(&[]).is_none());
///
/// let report = render(&[ChangeEntry {
///     project: "team/app".to_string(),
///     field: "visibility",
///     old: Some("private".to_string()),
///     new: Some("public".to_string()),
/// }])
/// .unwrap();
/// assert!(report.contains("    visibility:  \"private\" => \"public\"\n"));
/// ```
#[must_use]
pub fn render(entries: &[ChangeEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let width = entries.iter().map(|e| e.field.len()).max().unwrap_or(0) + 2;
    let mut by_project: BTreeMap<&str, BTreeMap<&str, &ChangeEntry>> = BTreeMap::new();
    for entry in entries {
        by_project
            .entry(entry.project.as_str())
            .or_default()
            .insert(entry.field, entry);
    }

    let mut out = String::from("\nCHANGE LOG\n");
    for (project, fields) in by_project {
        let _ = writeln!(out, "  {project}");
        for (name, entry) in fields {
            let label = format!("{name}:");
            let _ = writeln!(
                out,
                "    {label:<width$} {} => {}",
                shown(entry.old.as_deref()),
                shown(entry.new.as_deref())
            );
        }
        out.push('\n');
    }
    Some(out)
}

/// Diff and render in one step.
#[must_use]
pub fn report(before: &Snapshots, after: &Snapshots) -> Option<String> {
    render(&diff(before, after))
}
